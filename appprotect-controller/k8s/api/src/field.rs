//! Defensive accessors for fields nested in a dynamically-typed resource body.
//!
//! Every lookup distinguishes between a field that is absent and a field (or one of its parents)
//! that is present with the wrong shape.

use serde_json::{Map, Value};
use std::fmt;

/// The shape a field is expected to have.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Shape {
    Any,
    Map,
    Seq,
    String,
}

/// A field that must be present in a resource.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RequiredField {
    pub path: &'static [&'static str],
    pub shape: Shape,
}

#[derive(Clone, Debug, thiserror::Error, Eq, PartialEq)]
pub enum FieldError {
    #[error("Required field {path} not found")]
    NotFound { path: String },

    #[error(
        "Error checking for required field {path}: {at} accessor error: value is of the type \
         {found}, expected {expected}"
    )]
    WrongShape {
        path: String,
        at: String,
        found: &'static str,
        expected: Shape,
    },
}

// === impl Shape ===

impl Shape {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::Map => value.is_object(),
            Self::Seq => value.is_array(),
            Self::String => value.is_string(),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Map => f.write_str("map"),
            Self::Seq => f.write_str("sequence"),
            Self::String => f.write_str("string"),
        }
    }
}

// === impl FieldError ===

impl FieldError {
    fn not_found(path: &[&str]) -> Self {
        Self::NotFound {
            path: path.join("."),
        }
    }

    fn wrong_shape(path: &[&str], depth: usize, value: &Value, expected: Shape) -> Self {
        Self::WrongShape {
            path: path.join("."),
            at: format!(".{}", path[..depth].join(".")),
            found: type_name(value),
            expected,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// === impl RequiredField ===

impl RequiredField {
    pub const fn new(path: &'static [&'static str], shape: Shape) -> Self {
        Self { path, shape }
    }
}

/// Returns the value at `path`, with no constraint on its shape.
pub fn nested<'v>(value: &'v Value, path: &[&str]) -> Result<&'v Value, FieldError> {
    let mut current = value;
    for (depth, segment) in path.iter().enumerate() {
        let map = current
            .as_object()
            .ok_or_else(|| FieldError::wrong_shape(path, depth, current, Shape::Map))?;
        current = map
            .get(*segment)
            .ok_or_else(|| FieldError::not_found(path))?;
    }
    Ok(current)
}

/// Returns the value at `path` if it has the expected shape.
pub fn nested_shape<'v>(
    value: &'v Value,
    path: &[&str],
    shape: Shape,
) -> Result<&'v Value, FieldError> {
    let found = nested(value, path)?;
    if shape.matches(found) {
        Ok(found)
    } else {
        Err(FieldError::wrong_shape(path, path.len(), found, shape))
    }
}

pub fn nested_map<'v>(value: &'v Value, path: &[&str]) -> Result<&'v Map<String, Value>, FieldError> {
    nested(value, path)?
        .as_object()
        .ok_or_else(|| mismatch(value, path, Shape::Map))
}

pub fn nested_seq<'v>(value: &'v Value, path: &[&str]) -> Result<&'v Vec<Value>, FieldError> {
    nested(value, path)?
        .as_array()
        .ok_or_else(|| mismatch(value, path, Shape::Seq))
}

pub fn nested_str<'v>(value: &'v Value, path: &[&str]) -> Result<&'v str, FieldError> {
    nested(value, path)?
        .as_str()
        .ok_or_else(|| mismatch(value, path, Shape::String))
}

/// Like `nested_shape`, but an absent field is not an error.
pub fn optional_shape<'v>(
    value: &'v Value,
    path: &[&str],
    shape: Shape,
) -> Result<Option<&'v Value>, FieldError> {
    match nested_shape(value, path, shape) {
        Ok(found) => Ok(Some(found)),
        Err(error) if error.is_not_found() => Ok(None),
        Err(error) => Err(error),
    }
}

/// Checks each of `fields` in order, failing on the first that is absent or mis-shaped.
pub fn check_required(value: &Value, fields: &[RequiredField]) -> Result<(), FieldError> {
    for field in fields {
        nested_shape(value, field.path, field.shape)?;
    }
    Ok(())
}

fn mismatch(value: &Value, path: &[&str], shape: Shape) -> FieldError {
    match nested(value, path) {
        Ok(found) => FieldError::wrong_shape(path, path.len(), found, shape),
        Err(error) => error,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "map",
    }
}
