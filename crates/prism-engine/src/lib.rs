//! Prism engine crate.
//!
//! Declarative draw-state setup on top of a handle-based render resource
//! manager, with a wgpu backend for windows and a headless backend for tests.

pub mod core;
pub mod gpu;
pub mod logging;
pub mod render;
pub mod resource;
pub mod window;
