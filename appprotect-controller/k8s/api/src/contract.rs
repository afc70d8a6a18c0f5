//! The structural contract each resource kind must satisfy before it is indexed.

use crate::{
    field::{self, FieldError, RequiredField, Shape},
    ResourceKind,
};
use appprotect_controller_core::Subsystem;
use kube::api::{DynamicObject, ResourceExt};

/// An ordered list of fields that a resource of `kind` must carry.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Contract {
    kind: ResourceKind,
    fields: &'static [RequiredField],
}

#[derive(Clone, Debug, thiserror::Error, Eq, PartialEq)]
#[error("Error validating {} {name}: {source}", .kind.display_name())]
pub struct ValidationError {
    pub kind: ResourceKind,
    pub name: String,
    pub source: FieldError,
}

pub const POLICY: Contract = Contract {
    kind: ResourceKind::Policy,
    fields: &[RequiredField::new(&["spec", "policy"], Shape::Map)],
};

pub const LOG_CONF: Contract = Contract {
    kind: ResourceKind::LogConf,
    fields: &[
        RequiredField::new(&["spec", "content"], Shape::Map),
        RequiredField::new(&["spec", "filter"], Shape::Map),
    ],
};

pub const USER_SIG: Contract = Contract {
    kind: ResourceKind::UserSig,
    fields: &[RequiredField::new(&["spec", "signatures"], Shape::Seq)],
};

pub const DOS_POLICY: Contract = Contract {
    kind: ResourceKind::DosPolicy,
    fields: &[
        RequiredField::new(&["spec", "mitigation_mode"], Shape::Any),
        RequiredField::new(&["spec", "use_automation_tools_detection"], Shape::Any),
        RequiredField::new(&["spec", "signatures"], Shape::Any),
        RequiredField::new(&["spec", "bad_actors"], Shape::Any),
    ],
};

/// The DoS subsystem only requires that a policy has a spec.
pub const DOS_ONLY_POLICY: Contract = Contract {
    kind: ResourceKind::DosPolicy,
    fields: &[RequiredField::new(&["spec"], Shape::Map)],
};

pub const DOS_LOG_CONF: Contract = Contract {
    kind: ResourceKind::DosLogConf,
    fields: &[
        RequiredField::new(&["spec", "content"], Shape::Map),
        RequiredField::new(&["spec", "filter"], Shape::Map),
    ],
};

// === impl Contract ===

impl Contract {
    pub fn for_kind(kind: ResourceKind, subsystem: Subsystem) -> &'static Self {
        match (kind, subsystem) {
            (ResourceKind::Policy, _) => &POLICY,
            (ResourceKind::LogConf, _) => &LOG_CONF,
            (ResourceKind::UserSig, _) => &USER_SIG,
            (ResourceKind::DosPolicy, Subsystem::AppProtect) => &DOS_POLICY,
            (ResourceKind::DosPolicy, Subsystem::AppProtectDos) => &DOS_ONLY_POLICY,
            (ResourceKind::DosLogConf, _) => &DOS_LOG_CONF,
        }
    }

    pub fn validate(&self, obj: &DynamicObject) -> Result<(), ValidationError> {
        field::check_required(&obj.data, self.fields).map_err(|source| ValidationError {
            kind: self.kind,
            name: obj.name_any(),
            source,
        })
    }
}
