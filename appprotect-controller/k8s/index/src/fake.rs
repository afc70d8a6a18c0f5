use crate::{Configuration, LookupError, Updates};
use ahash::AHashMap as HashMap;
use appprotect_controller_core::ResourceKey;
use appprotect_controller_k8s_api::{self as k8s, DynamicObject, ResourceKind};

/// A `Configuration` that accepts every resource without validation.
///
/// Intended for testing configuration consumers in isolation. Writes never report changes or
/// problems, and deletes are ignored.
#[derive(Debug, Default)]
pub struct FakeStore {
    resources: HashMap<(ResourceKind, ResourceKey), DynamicObject>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Configuration for FakeStore {
    fn add_or_update(&mut self, kind: ResourceKind, obj: DynamicObject) -> Updates {
        self.resources.insert((kind, k8s::resource_key(&obj)), obj);
        Updates::default()
    }

    fn get(&self, kind: ResourceKind, key: &ResourceKey) -> Result<&DynamicObject, LookupError> {
        self.resources
            .get(&(kind, key.clone()))
            .ok_or_else(|| LookupError::NotFound {
                kind,
                key: key.clone(),
            })
    }

    fn delete(&mut self, _: ResourceKind, _: &ResourceKey) -> Updates {
        Updates::default()
    }
}
