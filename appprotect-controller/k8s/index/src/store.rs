use crate::{
    build::{self, BuildError},
    AnyResource, LogConfResource, PolicyResource, Reason, Resource, UserSigResource, REJECTED,
};
use ahash::AHashMap as HashMap;
use appprotect_controller_core::{ResourceKey, Subsystem};
use appprotect_controller_k8s_api::{self as k8s, Contract, DynamicObject, ResourceKind};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

pub type SharedStore = Arc<RwLock<Store>>;

/// The operations the configuration generator relies on.
///
/// Writes return the changes that must be applied downstream along with the problems that should
/// be surfaced to users.
pub trait Configuration {
    fn add_or_update(&mut self, kind: ResourceKind, obj: DynamicObject) -> Updates;

    /// Returns the resource stored under `key` only if it is valid.
    fn get(&self, kind: ResourceKind, key: &ResourceKey) -> Result<&DynamicObject, LookupError>;

    fn delete(&mut self, kind: ResourceKind, key: &ResourceKey) -> Updates;
}

/// Holds App Protect resources, keyed by `namespace/name`, one map per kind.
#[derive(Debug)]
pub struct Store {
    subsystem: Subsystem,
    pub(crate) policies: HashMap<ResourceKey, PolicyResource>,
    log_confs: HashMap<ResourceKey, LogConfResource>,
    pub(crate) user_sigs: HashMap<ResourceKey, UserSigResource>,
    dos_policies: HashMap<ResourceKey, PolicyResource>,
    dos_log_confs: HashMap<ResourceKey, LogConfResource>,
}

#[derive(Clone, Debug, Default)]
pub struct Updates {
    pub changes: Vec<Change>,
    pub problems: Vec<Problem>,
}

/// Describes what the configuration generator must do for a resource.
#[derive(Clone, Debug)]
pub struct Change {
    pub op: Operation,
    pub resource: AnyResource,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Operation {
    AddOrUpdate,
    Delete,
}

/// A user-visible report about a rejected resource.
#[derive(Clone, Debug)]
pub struct Problem {
    pub obj: Arc<DynamicObject>,
    pub reason: &'static str,
    pub message: String,
}

#[derive(Clone, Debug, thiserror::Error, Eq, PartialEq)]
pub enum LookupError {
    #[error("{} {key} not found", .kind.display_name())]
    NotFound {
        kind: ResourceKind,
        key: ResourceKey,
    },

    #[error("{0}")]
    Invalid(Reason),
}

// === impl Store ===

impl Store {
    pub fn new(subsystem: Subsystem) -> Self {
        Self {
            subsystem,
            policies: HashMap::default(),
            log_confs: HashMap::default(),
            user_sigs: HashMap::default(),
            dos_policies: HashMap::default(),
            dos_log_confs: HashMap::default(),
        }
    }

    pub fn shared(subsystem: Subsystem) -> SharedStore {
        Arc::new(RwLock::new(Self::new(subsystem)))
    }

    /// Returns the keys of all stored resources of `kind`, valid or not, in sorted order.
    #[cfg(test)]
    pub(crate) fn keys(&self, kind: ResourceKind) -> Vec<ResourceKey> {
        let mut keys = match kind {
            ResourceKind::Policy => self.policies.keys().cloned().collect::<Vec<_>>(),
            ResourceKind::LogConf => self.log_confs.keys().cloned().collect(),
            ResourceKind::UserSig => self.user_sigs.keys().cloned().collect(),
            ResourceKind::DosPolicy => self.dos_policies.keys().cloned().collect(),
            ResourceKind::DosLogConf => self.dos_log_confs.keys().cloned().collect(),
        };
        keys.sort();
        keys
    }

    fn lookup(
        &self,
        kind: ResourceKind,
        key: &ResourceKey,
    ) -> Option<(&DynamicObject, Option<Reason>)> {
        match kind {
            ResourceKind::Policy => self.policies.get(key).map(|r| (r.obj(), r.error())),
            ResourceKind::LogConf => self.log_confs.get(key).map(|r| (r.obj(), r.error())),
            ResourceKind::UserSig => self.user_sigs.get(key).map(|r| (r.obj(), r.error())),
            ResourceKind::DosPolicy => self.dos_policies.get(key).map(|r| (r.obj(), r.error())),
            ResourceKind::DosLogConf => self.dos_log_confs.get(key).map(|r| (r.obj(), r.error())),
        }
    }
}

impl Configuration for Store {
    fn add_or_update(&mut self, kind: ResourceKind, obj: DynamicObject) -> Updates {
        let contract = Contract::for_kind(kind, self.subsystem);
        let key = k8s::resource_key(&obj);
        let obj = Arc::new(obj);
        let mut updates = Updates::default();

        match kind {
            ResourceKind::Policy => {
                let mut policy = record(&obj, build::policy(contract, &obj), &mut updates);
                let unsatisfied = policy
                    .spec()
                    .and_then(|spec| self.check_signature_requirements(spec));
                if let (None, Some(reason)) = (policy.error(), unsatisfied) {
                    policy = policy.with_error(Some(reason));
                    updates.rejected(&obj, reason.to_string());
                }
                updates.changed(AnyResource::Policy(policy.clone()));
                self.policies.insert(key.clone(), policy);
            }
            ResourceKind::LogConf => {
                let log_conf = record(&obj, build::log_conf(contract, &obj), &mut updates);
                updates.changed(AnyResource::LogConf(log_conf.clone()));
                self.log_confs.insert(key.clone(), log_conf);
            }
            ResourceKind::UserSig => {
                let user_sig = record(&obj, build::user_sig(contract, &obj), &mut updates);
                self.user_sigs.insert(key.clone(), user_sig);
                self.user_sigs_changed(Some(&key), &mut updates);
            }
            ResourceKind::DosPolicy => {
                let policy = record(&obj, build::policy(contract, &obj), &mut updates);
                updates.changed(AnyResource::DosPolicy(policy.clone()));
                self.dos_policies.insert(key.clone(), policy);
            }
            ResourceKind::DosLogConf => {
                let log_conf = record(&obj, build::log_conf(contract, &obj), &mut updates);
                updates.changed(AnyResource::DosLogConf(log_conf.clone()));
                self.dos_log_confs.insert(key.clone(), log_conf);
            }
        }

        debug!(
            %kind,
            %key,
            changes = updates.changes.len(),
            problems = updates.problems.len(),
            "Indexed"
        );
        updates
    }

    fn get(&self, kind: ResourceKind, key: &ResourceKey) -> Result<&DynamicObject, LookupError> {
        match self.lookup(kind, key) {
            Some((obj, None)) => Ok(obj),
            Some((_, Some(reason))) => Err(LookupError::Invalid(reason)),
            None => Err(LookupError::NotFound {
                kind,
                key: key.clone(),
            }),
        }
    }

    fn delete(&mut self, kind: ResourceKind, key: &ResourceKey) -> Updates {
        let removed = match kind {
            ResourceKind::Policy => self.policies.remove(key).map(AnyResource::Policy),
            ResourceKind::LogConf => self.log_confs.remove(key).map(AnyResource::LogConf),
            ResourceKind::UserSig => self.user_sigs.remove(key).map(AnyResource::UserSig),
            ResourceKind::DosPolicy => self.dos_policies.remove(key).map(AnyResource::DosPolicy),
            ResourceKind::DosLogConf => {
                self.dos_log_confs.remove(key).map(AnyResource::DosLogConf)
            }
        };

        let mut updates = Updates::default();
        let Some(resource) = removed else {
            debug!(%kind, %key, "Not indexed");
            return updates;
        };
        updates.removed(resource);
        if kind == ResourceKind::UserSig {
            self.user_sigs_changed(None, &mut updates);
        }

        debug!(
            %kind,
            %key,
            changes = updates.changes.len(),
            problems = updates.problems.len(),
            "Deleted"
        );
        updates
    }
}

/// Converts a build result into a stored resource, reporting a problem if the build failed.
fn record<T>(
    obj: &Arc<DynamicObject>,
    built: Result<T, BuildError>,
    updates: &mut Updates,
) -> Resource<T> {
    match built {
        Ok(spec) => Resource::valid(obj.clone(), spec),
        Err(error) => {
            updates.rejected(obj, error.to_string());
            Resource::invalid(obj.clone(), error.reason())
        }
    }
}

// === impl Updates ===

impl Updates {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.problems.is_empty()
    }

    /// Records a change for a stored resource. Invalid resources must be removed downstream.
    pub(crate) fn changed(&mut self, resource: AnyResource) {
        let op = if resource.is_valid() {
            Operation::AddOrUpdate
        } else {
            Operation::Delete
        };
        self.changes.push(Change { op, resource });
    }

    pub(crate) fn removed(&mut self, resource: AnyResource) {
        self.changes.push(Change {
            op: Operation::Delete,
            resource,
        });
    }

    pub(crate) fn rejected(&mut self, obj: &Arc<DynamicObject>, message: String) {
        self.problems.push(Problem {
            obj: obj.clone(),
            reason: REJECTED,
            message,
        });
    }
}

// === impl LookupError ===

impl LookupError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
