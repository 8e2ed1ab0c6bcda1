//! Render resources and draw-state application.
//!
//! Applications describe resources with setup descriptors (`setup`), submit
//! them to a [`RenderManager`] and get back [`ResourceId`] handles. The
//! manager validates references, owns the live objects, and enforces the
//! frame boundary:
//!
//! ```text
//! begin_frame -> clear / apply_draw_state / apply_uniforms / draw -> end_frame
//! ```
//!
//! GPU work goes through a [`RenderBackend`]: `gpu::WgpuBackend` for a real
//! window, [`headless::HeadlessBackend`] for tests and GPU-less runs.
//!
//! [`ResourceId`]: crate::resource::ResourceId

mod backend;
mod error;
mod frame;
pub mod headless;
mod manager;
pub mod setup;
pub mod state;

pub use backend::RenderBackend;
pub use error::{BackendError, RenderError, Result};
pub use frame::FrameState;
pub use manager::{RenderManager, ResourceSetup};
