//! wgpu device, surface and render backend.
//!
//! - `Gpu` creates the Instance/Adapter/Device/Queue, configures the window
//!   surface and owns the default render target attachments
//! - `WgpuBackend` turns validated setups into buffers, shader modules and
//!   render pipelines and records frames

mod backend;
mod context;
mod convert;
mod init;
mod surface;

pub use backend::{WgpuBackend, WgpuMesh, WgpuPipeline, WgpuProgram};
pub use context::Gpu;
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
