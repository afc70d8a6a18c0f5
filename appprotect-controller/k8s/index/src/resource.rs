use crate::Reason;
use appprotect_controller_k8s_api::{self as k8s, DynamicObject, ResourceKey, ResourceKind};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// A resource as delivered by the cluster, along with what the index made of it.
///
/// A resource is either valid or carries the reason it was rejected. A resource rejected before
/// its typed representation could be built has no `spec`. A policy rejected only because its
/// signature requirements are unsatisfied keeps its `spec`, so that it can be re-checked when user
/// signatures change.
#[derive(Clone, Debug)]
pub struct Resource<T> {
    obj: Arc<DynamicObject>,
    spec: Option<T>,
    error: Option<Reason>,
}

pub type PolicyResource = Resource<Policy>;
pub type LogConfResource = Resource<()>;
pub type UserSigResource = Resource<UserSig>;
pub type DosPolicyResource = Resource<Policy>;
pub type DosLogConfResource = Resource<()>;

/// A resource of any indexed kind.
#[derive(Clone, Debug)]
pub enum AnyResource {
    Policy(PolicyResource),
    LogConf(LogConfResource),
    UserSig(UserSigResource),
    DosPolicy(DosPolicyResource),
    DosLogConf(DosLogConfResource),
}

/// The typed parts of an `APPolicy` or `APDosPolicy`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Policy {
    pub signature_requirements: Vec<SignatureRequirement>,
}

/// A user-defined signature tag that a policy requires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureRequirement {
    pub tag: String,
    pub revision_time_window: RevisionTimeWindow,
}

/// Bounds on the revision time of a required signature. A missing bound is unbounded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RevisionTimeWindow {
    pub min_revision_time: Option<DateTime<Utc>>,
    pub max_revision_time: Option<DateTime<Utc>>,
}

/// The typed parts of an `APUserSig`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserSig {
    /// The tag that policies use to require these signatures. May be empty.
    pub tag: String,
    pub revision_time: Option<DateTime<Utc>>,
}

// === impl Resource ===

impl<T> Resource<T> {
    pub(crate) fn valid(obj: Arc<DynamicObject>, spec: T) -> Self {
        Self {
            obj,
            spec: Some(spec),
            error: None,
        }
    }

    pub(crate) fn invalid(obj: Arc<DynamicObject>, reason: Reason) -> Self {
        Self {
            obj,
            spec: None,
            error: Some(reason),
        }
    }

    pub fn obj(&self) -> &DynamicObject {
        &self.obj
    }

    pub(crate) fn shared_obj(&self) -> &Arc<DynamicObject> {
        &self.obj
    }

    pub fn key(&self) -> ResourceKey {
        k8s::resource_key(&self.obj)
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// The reason this resource was rejected, if it was.
    pub fn error(&self) -> Option<Reason> {
        self.error
    }

    /// The typed representation of the resource, if it could be built.
    pub fn spec(&self) -> Option<&T> {
        self.spec.as_ref()
    }

    pub(crate) fn creation_time(&self) -> Option<DateTime<Utc>> {
        self.obj.metadata.creation_timestamp.as_ref().map(|t| t.0)
    }
}

impl<T: Clone> Resource<T> {
    /// Returns a copy of this resource with its validity replaced.
    pub(crate) fn with_error(&self, error: Option<Reason>) -> Self {
        Self {
            obj: self.obj.clone(),
            spec: self.spec.clone(),
            error,
        }
    }
}

// === impl AnyResource ===

impl AnyResource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Policy(_) => ResourceKind::Policy,
            Self::LogConf(_) => ResourceKind::LogConf,
            Self::UserSig(_) => ResourceKind::UserSig,
            Self::DosPolicy(_) => ResourceKind::DosPolicy,
            Self::DosLogConf(_) => ResourceKind::DosLogConf,
        }
    }

    pub fn obj(&self) -> &DynamicObject {
        match self {
            Self::Policy(r) | Self::DosPolicy(r) => r.obj(),
            Self::LogConf(r) | Self::DosLogConf(r) => r.obj(),
            Self::UserSig(r) => r.obj(),
        }
    }

    pub fn key(&self) -> ResourceKey {
        k8s::resource_key(self.obj())
    }

    pub fn is_valid(&self) -> bool {
        self.error().is_none()
    }

    pub fn error(&self) -> Option<Reason> {
        match self {
            Self::Policy(r) | Self::DosPolicy(r) => r.error(),
            Self::LogConf(r) | Self::DosLogConf(r) => r.error(),
            Self::UserSig(r) => r.error(),
        }
    }
}

// === impl RevisionTimeWindow ===

impl RevisionTimeWindow {
    /// Indicates whether `time` lies strictly within the present bounds.
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.min_revision_time.map_or(true, |min| time > min)
            && self.max_revision_time.map_or(true, |max| time < max)
    }
}

// === impl UserSig ===

impl UserSig {
    /// Indicates whether these signatures satisfy a policy's requirement.
    ///
    /// Signatures without a tag never satisfy a requirement. Signatures without a revision time
    /// satisfy any window.
    pub fn satisfies(&self, req: &SignatureRequirement) -> bool {
        if self.tag.is_empty() || self.tag != req.tag {
            return false;
        }
        match self.revision_time {
            Some(time) => req.revision_time_window.contains(time),
            None => true,
        }
    }
}
