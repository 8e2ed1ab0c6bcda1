use std::fmt;

use slotmap::{Key, new_key_type};

/// Kind of resource an id refers to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ResourceType {
    Mesh,
    Program,
    DrawState,
}

impl ResourceType {
    pub const fn name(self) -> &'static str {
        match self {
            ResourceType::Mesh => "mesh",
            ResourceType::Program => "program",
            ResourceType::DrawState => "draw-state",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

new_key_type! {
    /// Versioned slot key inside one resource pool.
    pub(crate) struct SlotKey;
}

/// Opaque handle to a resource slot owned by a `RenderManager`.
///
/// Ids are a versioned pool key tagged with the resource type. Removing a
/// resource bumps its slot's version, so an id kept past `release_resource`
/// no longer matches and is reported as `InvalidHandle` instead of aliasing
/// whatever lives in the recycled slot.
///
/// `ResourceId::INVALID` (also the `Default`) means "no resource".
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ResourceId {
    key: Option<SlotKey>,
    ty: ResourceType,
}

impl ResourceId {
    pub const INVALID: ResourceId = ResourceId {
        key: None,
        ty: ResourceType::Mesh,
    };

    #[inline]
    pub(crate) const fn new(key: SlotKey, ty: ResourceType) -> Self {
        Self { key: Some(key), ty }
    }

    #[inline]
    pub(crate) const fn key(self) -> Option<SlotKey> {
        self.key
    }

    #[inline]
    pub const fn ty(self) -> ResourceType {
        self.ty
    }

    /// True for any issued id, live or not. Liveness is only known to the manager.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.key.is_some()
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key {
            Some(key) => write!(f, "{}#{:?}", self.ty, key.data()),
            None => f.write_str("invalid-id"),
        }
    }
}
