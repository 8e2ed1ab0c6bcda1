use crate::render::state::{BlendState, DepthStencilState, RasterizerState};
use crate::resource::{Locator, ResourceId};

/// Setup object for draw-state resources.
///
/// A pure value: building, cloning or mutating it never touches the GPU. It
/// becomes a live resource only when passed to
/// [`RenderManager::create_resource`](crate::render::RenderManager::create_resource),
/// which copies it, so later mutation does not affect resources already
/// created from it. Deriving variants is plain field assignment:
///
/// ```ignore
/// let mut dss = DrawStateSetup::from_mesh_and_prog(mesh, prog, 0);
/// dss.rasterizer_state.multisample_enabled = true;
/// let msaa = render.create_resource(&dss)?;
/// dss.rasterizer_state.multisample_enabled = false;
/// let no_msaa = render.create_resource(&dss)?;
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DrawStateSetup {
    pub locator: Locator,
    pub blend_state: BlendState,
    pub depth_stencil_state: DepthStencilState,
    pub rasterizer_state: RasterizerState,
    /// Mesh to bind. Checked against the live meshes at creation.
    pub mesh: ResourceId,
    /// Program to bind. Checked against the live programs at creation.
    pub program: ResourceId,
    /// Selects a compiled variant of `program`; 0 is the base variant.
    pub program_selection_mask: u32,
}

impl DrawStateSetup {
    /// Draw state binding `mesh` and `program` with default fixed-function state.
    ///
    /// The ids are not validated here.
    pub fn from_mesh_and_prog(mesh: ResourceId, program: ResourceId, program_selection_mask: u32) -> Self {
        Self {
            mesh,
            program,
            program_selection_mask,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;
    use crate::render::state::{CompareFunc, Face};
    use crate::resource::ResourceType;
    use crate::resource::SlotKey;

    fn ids() -> (ResourceId, ResourceId) {
        let mut keys = SlotMap::<SlotKey, ()>::with_key();
        (
            ResourceId::new(keys.insert(()), ResourceType::Mesh),
            ResourceId::new(keys.insert(()), ResourceType::Program),
        )
    }

    #[test]
    fn from_mesh_and_prog_uses_documented_defaults() {
        let (mesh, prog) = ids();
        let dss = DrawStateSetup::from_mesh_and_prog(mesh, prog, 0);

        assert_eq!(dss.mesh, mesh);
        assert_eq!(dss.program, prog);
        assert_eq!(dss.program_selection_mask, 0);
        assert!(!dss.locator.is_shared());

        assert!(!dss.depth_stencil_state.depth_write_enabled);
        assert_eq!(dss.depth_stencil_state.depth_cmp_func, CompareFunc::Always);
        assert!(!dss.rasterizer_state.cull_face_enabled);
        assert_eq!(dss.rasterizer_state.cull_face, Face::Back);
        assert!(!dss.rasterizer_state.multisample_enabled);
        assert!(!dss.blend_state.blend_enabled);

        assert_eq!(dss.blend_state, BlendState::default());
        assert_eq!(dss.depth_stencil_state, DepthStencilState::default());
        assert_eq!(dss.rasterizer_state, RasterizerState::default());
    }

    #[test]
    fn selection_mask_is_kept() {
        let (mesh, prog) = ids();
        assert_eq!(DrawStateSetup::from_mesh_and_prog(mesh, prog, 0b101).program_selection_mask, 0b101);
    }

    #[test]
    fn default_references_no_resources() {
        let dss = DrawStateSetup::default();
        assert!(!dss.mesh.is_valid());
        assert!(!dss.program.is_valid());
    }

    #[test]
    fn clones_are_independent() {
        let (mesh, prog) = ids();
        let a = DrawStateSetup::from_mesh_and_prog(mesh, prog, 0);
        let mut b = a.clone();
        b.rasterizer_state.multisample_enabled = true;

        assert!(!a.rasterizer_state.multisample_enabled);
        assert_ne!(a, b);
    }
}
