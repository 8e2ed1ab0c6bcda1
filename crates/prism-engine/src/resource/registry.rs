use std::collections::HashMap;

use super::{Locator, ResourceId, ResourceType};

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
struct Key {
    ty: ResourceType,
    location: String,
    signature: u32,
}

impl Key {
    fn from_locator(ty: ResourceType, locator: &Locator) -> Option<Self> {
        if !locator.is_shared() {
            return None;
        }
        Some(Self {
            ty,
            location: locator.location()?.to_owned(),
            signature: locator.signature(),
        })
    }
}

#[derive(Debug)]
struct Entry {
    id: ResourceId,
    use_count: u32,
}

/// Shared-locator cache with use counts.
///
/// Only resources created through a shared locator are tracked here; every
/// other resource has an implicit use count of one.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    entries: HashMap<Key, Entry>,
    keys: HashMap<ResourceId, Key>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the id registered under `locator` without touching its use count.
    pub fn lookup(&self, ty: ResourceType, locator: &Locator) -> Option<ResourceId> {
        let key = Key::from_locator(ty, locator)?;
        self.entries.get(&key).map(|e| e.id)
    }

    /// Looks up `locator` and, on a hit, takes another use of the resource.
    pub fn acquire(&mut self, ty: ResourceType, locator: &Locator) -> Option<ResourceId> {
        let key = Key::from_locator(ty, locator)?;
        let entry = self.entries.get_mut(&key)?;
        entry.use_count += 1;
        Some(entry.id)
    }

    /// Registers a freshly created resource. Non-shared locators are ignored.
    pub fn add(&mut self, locator: &Locator, id: ResourceId) {
        let Some(key) = Key::from_locator(id.ty(), locator) else { return };
        debug_assert!(!self.entries.contains_key(&key), "locator registered twice");

        self.keys.insert(id, key.clone());
        self.entries.insert(key, Entry { id, use_count: 1 });
    }

    /// Drops one use of `id`.
    ///
    /// Returns `None` when `id` is not registered, otherwise the remaining use
    /// count. At zero the entry is removed and the caller destroys the resource.
    pub fn release(&mut self, id: ResourceId) -> Option<u32> {
        let key = self.keys.get(&id)?;
        let entry = self.entries.get_mut(key)?;
        entry.use_count = entry.use_count.saturating_sub(1);
        let remaining = entry.use_count;

        if remaining == 0 {
            if let Some(key) = self.keys.remove(&id) {
                self.entries.remove(&key);
            }
        }

        Some(remaining)
    }

    #[cfg(test)]
    fn use_count(&self, id: ResourceId) -> Option<u32> {
        let key = self.keys.get(&id)?;
        self.entries.get(key).map(|e| e.use_count)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;
    use crate::resource::SlotKey;

    fn mesh_id() -> ResourceId {
        let mut keys = SlotMap::<SlotKey, ()>::with_key();
        ResourceId::new(keys.insert(()), ResourceType::Mesh)
    }

    #[test]
    fn non_shared_locators_are_not_tracked() {
        let mut reg = ResourceRegistry::new();
        reg.add(&Locator::non_shared(), mesh_id());
        assert!(reg.is_empty());
        assert_eq!(reg.release(mesh_id()), None);
    }

    #[test]
    fn acquire_bumps_use_count() {
        let mut reg = ResourceRegistry::new();
        let loc = Locator::shared("shapes");
        reg.add(&loc, mesh_id());

        assert_eq!(reg.acquire(ResourceType::Mesh, &loc), Some(mesh_id()));
        assert_eq!(reg.use_count(mesh_id()), Some(2));
    }

    #[test]
    fn lookup_does_not_bump_use_count() {
        let mut reg = ResourceRegistry::new();
        let loc = Locator::shared("shapes");
        reg.add(&loc, mesh_id());

        assert_eq!(reg.lookup(ResourceType::Mesh, &loc), Some(mesh_id()));
        assert_eq!(reg.use_count(mesh_id()), Some(1));
    }

    #[test]
    fn lookup_is_per_type() {
        let mut reg = ResourceRegistry::new();
        let loc = Locator::shared("shapes");
        reg.add(&loc, mesh_id());
        assert_eq!(reg.lookup(ResourceType::Program, &loc), None);
    }

    #[test]
    fn release_to_zero_unregisters() {
        let mut reg = ResourceRegistry::new();
        let loc = Locator::shared("shapes");
        reg.add(&loc, mesh_id());
        reg.acquire(ResourceType::Mesh, &loc);

        assert_eq!(reg.release(mesh_id()), Some(1));
        assert_eq!(reg.release(mesh_id()), Some(0));
        assert_eq!(reg.lookup(ResourceType::Mesh, &loc), None);
        assert_eq!(reg.release(mesh_id()), None);
    }
}
