//! Fixed-function pipeline state blocks.
//!
//! Plain value structs with documented defaults. They describe GPU state; the
//! backend translates them when a draw state is created.

mod blend;
mod depth_stencil;
mod rasterizer;

pub use blend::{BlendFactor, BlendOperation, BlendState, PixelChannel};
pub use depth_stencil::{CompareFunc, DepthStencilState, StencilOp, StencilState};
pub use rasterizer::{Face, RasterizerState};
