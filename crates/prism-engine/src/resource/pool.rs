use slotmap::SlotMap;

use super::{ResourceId, ResourceType, SlotKey};

/// Live resources of one type, keyed by versioned slots.
///
/// `capacity` bounds the number of live entries. Ids of another type, or of
/// entries already removed or cleared, never resolve.
pub struct ResourcePool<T> {
    ty: ResourceType,
    capacity: usize,
    slots: SlotMap<SlotKey, T>,
}

impl<T> ResourcePool<T> {
    pub fn new(ty: ResourceType, capacity: usize) -> Self {
        Self {
            ty,
            capacity,
            slots: SlotMap::with_capacity_and_key(capacity),
        }
    }

    #[inline]
    pub fn ty(&self) -> ResourceType {
        self.ty
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    /// Stores `value` and returns its id, or hands `value` back when the pool is full.
    pub fn alloc(&mut self, value: T) -> Result<ResourceId, T> {
        if self.is_full() {
            return Err(value);
        }
        Ok(ResourceId::new(self.slots.insert(value), self.ty))
    }

    fn key(&self, id: ResourceId) -> Option<SlotKey> {
        if id.ty() != self.ty {
            return None;
        }
        id.key()
    }

    #[inline]
    pub fn contains(&self, id: ResourceId) -> bool {
        self.key(id).is_some_and(|key| self.slots.contains_key(key))
    }

    pub fn get(&self, id: ResourceId) -> Option<&T> {
        self.slots.get(self.key(id)?)
    }

    /// Removes the entry and invalidates `id`.
    pub fn remove(&mut self, id: ResourceId) -> Option<T> {
        let key = self.key(id)?;
        self.slots.remove(key)
    }

    /// Drops every live entry, invalidating all ids issued so far.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(capacity: usize) -> ResourcePool<&'static str> {
        ResourcePool::new(ResourceType::Mesh, capacity)
    }

    // ── alloc / get ───────────────────────────────────────────────────────

    #[test]
    fn alloc_returns_distinct_live_ids() {
        let mut p = pool(8);
        let a = p.alloc("a").unwrap();
        let b = p.alloc("b").unwrap();
        assert_ne!(a, b);
        assert_eq!(p.get(a), Some(&"a"));
        assert_eq!(p.get(b), Some(&"b"));
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn alloc_fails_when_full() {
        let mut p = pool(1);
        p.alloc("a").unwrap();
        assert_eq!(p.alloc("b"), Err("b"));
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn foreign_type_is_rejected() {
        let mut p = pool(8);
        let id = p.alloc("a").unwrap();
        let foreign = ResourceId::new(id.key().unwrap(), ResourceType::Program);
        assert!(!p.contains(foreign));
        assert_eq!(p.get(foreign), None);
    }

    #[test]
    fn invalid_id_is_rejected() {
        let mut p = pool(8);
        p.alloc("a").unwrap();
        assert!(!p.contains(ResourceId::INVALID));
    }

    // ── remove / recycle ──────────────────────────────────────────────────

    #[test]
    fn remove_invalidates_id() {
        let mut p = pool(8);
        let id = p.alloc("a").unwrap();
        assert_eq!(p.remove(id), Some("a"));
        assert!(!p.contains(id));
        assert_eq!(p.remove(id), None);
        assert!(p.is_empty());
    }

    #[test]
    fn recycled_slot_does_not_revive_stale_id() {
        let mut p = pool(8);
        let old = p.alloc("a").unwrap();
        p.remove(old);
        let new = p.alloc("b").unwrap();

        assert_ne!(old, new);
        assert_eq!(p.get(old), None);
        assert_eq!(p.get(new), Some(&"b"));
    }

    #[test]
    fn released_capacity_is_reusable() {
        let mut p = pool(1);
        let a = p.alloc("a").unwrap();
        p.remove(a);
        assert!(p.alloc("b").is_ok());
    }

    // ── clear ─────────────────────────────────────────────────────────────

    #[test]
    fn clear_invalidates_everything() {
        let mut p = pool(8);
        let ids: Vec<_> = ["a", "b", "c"].into_iter().map(|v| p.alloc(v).unwrap()).collect();
        p.clear();

        assert!(p.is_empty());
        assert!(ids.iter().all(|&id| !p.contains(id)));

        let fresh = p.alloc("d").unwrap();
        assert!(!ids.contains(&fresh));
    }
}
