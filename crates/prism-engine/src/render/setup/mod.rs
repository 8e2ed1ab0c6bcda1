//! Setup objects: inert descriptions of resources and of the render system.

mod draw_state;
mod mesh;
mod program;
mod render;

pub use draw_state::DrawStateSetup;
pub use mesh::{
    IndexType, MeshSetup, PrimitiveGroup, PrimitiveType, VertexAttr, VertexFormat, VertexLayout,
};
pub(crate) use program::variant_index;
pub use program::{ProgramSetup, ProgramVariant};
pub use render::{ClearState, DisplayAttrs, RenderSetup};
