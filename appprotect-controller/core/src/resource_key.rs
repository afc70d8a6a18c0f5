use std::{fmt, str::FromStr};

/// Identifies a namespaced resource. Rendered as `namespace/name`.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct ResourceKey {
    pub namespace: String,
    pub name: String,
}

#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
#[error("resource key must have the form namespace/name: {0:?}")]
pub struct ParseKeyError(String);

impl ResourceKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl FromStr for ResourceKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((namespace, name)) => Ok(Self::new(namespace, name)),
            None => Err(ParseKeyError(s.to_string())),
        }
    }
}

/// Resolves a resource reference as written in an annotation or spec.
///
/// A bare name refers to a resource in `namespace`. A reference that already contains a `/` is
/// namespace-qualified and is used as-is.
pub fn parse_resource_reference(namespace: &str, reference: &str) -> ResourceKey {
    match reference.split_once('/') {
        Some((ns, name)) => ResourceKey::new(ns, name),
        None => ResourceKey::new(namespace, reference),
    }
}
