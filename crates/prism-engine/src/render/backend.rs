use super::error::BackendError;
use super::setup::{ClearState, DisplayAttrs, DrawStateSetup, MeshSetup, PrimitiveGroup, ProgramSetup};

/// GPU collaborator behind `RenderManager`.
///
/// The manager owns validation, handle bookkeeping and frame discipline; a
/// backend only turns already-validated setups into GPU objects and records
/// commands in the order it receives them. Calls that need an open frame are
/// only issued between a successful `begin_frame` and `end_frame`.
pub trait RenderBackend {
    type Mesh;
    type Program;
    type Pipeline;

    fn create_mesh(&mut self, setup: &MeshSetup) -> Result<Self::Mesh, BackendError>;

    /// Compiles every variant of `setup`.
    fn create_program(&mut self, setup: &ProgramSetup) -> Result<Self::Program, BackendError>;

    /// Builds the pipeline for `variant` of `program` with the fixed-function
    /// state of `setup`.
    fn create_pipeline(
        &mut self,
        mesh: &Self::Mesh,
        program: &Self::Program,
        variant: usize,
        setup: &DrawStateSetup,
    ) -> Result<Self::Pipeline, BackendError>;

    /// Starts a frame. Returns `false` when nothing can be rendered right now
    /// (e.g. the window is minimized); no frame is open in that case.
    fn begin_frame(&mut self) -> bool;

    fn clear(&mut self, clear: &ClearState);

    fn apply_pipeline(&mut self, pipeline: &Self::Pipeline, mesh: &Self::Mesh);

    /// Uploads the uniform block for the next draws of the applied pipeline.
    fn apply_uniforms(&mut self, data: &[u8]) -> Result<(), BackendError>;

    fn draw(&mut self, mesh: &Self::Mesh, group: PrimitiveGroup);

    /// Submits and presents the frame.
    fn end_frame(&mut self);

    fn display_attrs(&self) -> DisplayAttrs;
}
