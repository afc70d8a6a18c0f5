#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod contract;
pub mod field;
mod kind;
mod watch;

pub use self::{
    contract::{Contract, ValidationError},
    field::{FieldError, RequiredField, Shape},
    kind::ResourceKind,
    watch::{Event, Watch},
};
pub use appprotect_controller_core::ResourceKey;
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
pub use kube::api::{ApiResource, DynamicObject, GroupVersionKind, ObjectMeta, ResourceExt};

/// Returns the key under which a resource is indexed, i.e. `namespace/name`.
///
/// Cluster-scoped or unsaved objects have no namespace; they are keyed with an empty one.
pub fn resource_key(obj: &DynamicObject) -> ResourceKey {
    ResourceKey::new(obj.namespace().unwrap_or_default(), obj.name_any())
}
