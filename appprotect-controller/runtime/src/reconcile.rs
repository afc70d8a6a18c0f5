use crate::{
    index::{Configuration, Operation, SharedStore, Updates},
    k8s::{self, DynamicObject, ResourceKey, ResourceKind},
};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

/// Applies watch events for a single resource kind to the shared store.
///
/// `kubert::index::namespaced` drives this index. It replays resources on watch restarts and
/// deletes those that were not replayed.
#[derive(Debug)]
pub(crate) struct KindIndex {
    kind: ResourceKind,
    store: SharedStore,
}

// === impl KindIndex ===

impl KindIndex {
    pub(crate) fn shared(kind: ResourceKind, store: SharedStore) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(Self { kind, store }))
    }
}

impl kubert::index::IndexNamespacedResource<DynamicObject> for KindIndex {
    fn apply(&mut self, obj: DynamicObject) {
        let updates = self.store.write().add_or_update(self.kind, obj);
        report(&updates);
    }

    fn delete(&mut self, namespace: String, name: String) {
        let key = ResourceKey::new(namespace, name);
        let updates = self.store.write().delete(self.kind, &key);
        report(&updates);
    }
}

fn report(updates: &Updates) {
    for change in &updates.changes {
        let kind = change.resource.kind();
        let key = change.resource.key();
        match change.op {
            Operation::AddOrUpdate => info!(%kind, %key, "Updated"),
            Operation::Delete => match change.resource.error() {
                Some(reason) => info!(%kind, %key, %reason, "Removed invalid resource"),
                None => info!(%kind, %key, "Removed"),
            },
        }
    }

    for problem in &updates.problems {
        let key = k8s::resource_key(&problem.obj);
        warn!(%key, reason = problem.reason, message = %problem.message, "Problem");
    }
}
