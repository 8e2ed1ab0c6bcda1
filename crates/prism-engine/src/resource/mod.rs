//! Resource identity.
//!
//! Ids, locators and the storage the render manager keeps live resources in.
//! Nothing here touches the GPU.

mod id;
mod locator;
mod pool;
mod registry;

pub(crate) use id::SlotKey;
pub use id::{ResourceId, ResourceType};
pub use locator::Locator;
pub use pool::ResourcePool;
pub use registry::ResourceRegistry;
