//! App Protect resource index
//!
//! The index holds the controller's view of App Protect custom resources as they are delivered by
//! cluster watches:
//!
//! - `APPolicy` resources may require user-defined signatures by tag and revision time.
//! - `APUserSig` resources provide signatures under a tag. At most one signature may own a tag.
//! - `APLogConf`, `APDosPolicy`, and `APDosLogConf` resources stand alone.
//!
//! ```text
//! [ APPolicy ] -> (signature-requirements) -> [ APUserSig ]
//! ```
//!
//! Each resource is validated against its kind's structural contract and converted into a typed
//! representation. Resources that fail are still indexed, so that lookups can report why they were
//! rejected. Every update returns the `Change`s that the configuration generator must apply and
//! the `Problem`s that should be reported to users. Adding or removing a user signature may flip
//! the validity of policies that require it; those policies are reported as changes too.
//!
//! The `Store` is not synchronized. It is owned by a single task that applies watch events in
//! order, or shared behind a lock as a `SharedStore`.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod build;
mod fake;
mod reason;
mod resource;
mod signatures;
mod store;

#[cfg(test)]
mod tests;

pub use self::{
    build::BuildError,
    fake::FakeStore,
    reason::{Reason, REJECTED},
    resource::{
        AnyResource, DosLogConfResource, DosPolicyResource, LogConfResource, Policy,
        PolicyResource, Resource, RevisionTimeWindow, SignatureRequirement, UserSig,
        UserSigResource,
    },
    store::{Change, Configuration, LookupError, Operation, Problem, SharedStore, Store, Updates},
};
pub use appprotect_controller_core::{ResourceKey, Subsystem};
pub use appprotect_controller_k8s_api::ResourceKind;
