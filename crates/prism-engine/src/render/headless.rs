//! GPU-less backend.
//!
//! Records every backend call into a shared, ordered command log. Used by the
//! headless runtime and by tests that check what reached the "GPU" and in
//! which order.

use std::cell::RefCell;
use std::rc::Rc;

use super::backend::RenderBackend;
use super::error::BackendError;
use super::setup::{
    ClearState, DisplayAttrs, DrawStateSetup, MeshSetup, PrimitiveGroup, ProgramSetup, RenderSetup,
};
use super::state::PixelChannel;

/// One recorded backend call. Objects are identified by creation serial.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    CreateMesh { mesh: u64, num_vertices: u32 },
    CreateProgram { program: u64, variants: usize },
    CreatePipeline { pipeline: u64, mesh: u64, program: u64, variant: usize, multisample: bool },
    BeginFrame,
    Clear { channels: PixelChannel },
    ApplyPipeline { pipeline: u64 },
    ApplyUniforms { size: usize },
    Draw { mesh: u64, group: PrimitiveGroup },
    EndFrame,
}

/// Cloneable handle to a headless backend's command log.
#[derive(Debug, Clone, Default)]
pub struct CommandLog(Rc<RefCell<Vec<BackendCommand>>>);

impl CommandLog {
    fn push(&self, cmd: BackendCommand) {
        self.0.borrow_mut().push(cmd);
    }

    pub fn snapshot(&self) -> Vec<BackendCommand> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Commands recorded between the last `BeginFrame` and its `EndFrame`
    /// (or the end of the log), excluding both markers.
    pub fn last_frame(&self) -> Vec<BackendCommand> {
        let log = self.0.borrow();
        let Some(start) = log.iter().rposition(|c| *c == BackendCommand::BeginFrame) else {
            return Vec::new();
        };
        log[start + 1..]
            .iter()
            .take_while(|c| **c != BackendCommand::EndFrame)
            .cloned()
            .collect()
    }
}

#[derive(Debug)]
pub struct HeadlessMesh {
    serial: u64,
}

#[derive(Debug)]
pub struct HeadlessProgram {
    serial: u64,
}

#[derive(Debug)]
pub struct HeadlessPipeline {
    serial: u64,
}

pub struct HeadlessBackend {
    display: DisplayAttrs,
    log: CommandLog,
    next_serial: u64,
    minimized: bool,
    fail_creation: bool,
}

impl HeadlessBackend {
    pub fn new(setup: &RenderSetup) -> Self {
        Self {
            display: DisplayAttrs {
                framebuffer_width: setup.width,
                framebuffer_height: setup.height,
                sample_count: setup.sample_count,
            },
            log: CommandLog::default(),
            next_serial: 1,
            minimized: false,
            fail_creation: false,
        }
    }

    pub fn log(&self) -> CommandLog {
        self.log.clone()
    }

    /// While minimized, `begin_frame` refuses to open a frame.
    pub fn set_minimized(&mut self, minimized: bool) {
        self.minimized = minimized;
    }

    /// Makes every subsequent create call fail with a `BackendError`.
    pub fn set_fail_creation(&mut self, fail: bool) {
        self.fail_creation = fail;
    }

    fn serial(&mut self, what: &str) -> Result<u64, BackendError> {
        if self.fail_creation {
            return Err(BackendError::new(format!("headless {what} creation disabled")));
        }
        let serial = self.next_serial;
        self.next_serial += 1;
        Ok(serial)
    }
}

impl RenderBackend for HeadlessBackend {
    type Mesh = HeadlessMesh;
    type Program = HeadlessProgram;
    type Pipeline = HeadlessPipeline;

    fn create_mesh(&mut self, setup: &MeshSetup) -> Result<HeadlessMesh, BackendError> {
        let serial = self.serial("mesh")?;
        self.log.push(BackendCommand::CreateMesh {
            mesh: serial,
            num_vertices: setup.num_vertices,
        });
        Ok(HeadlessMesh { serial })
    }

    fn create_program(&mut self, setup: &ProgramSetup) -> Result<HeadlessProgram, BackendError> {
        let serial = self.serial("program")?;
        self.log.push(BackendCommand::CreateProgram {
            program: serial,
            variants: setup.variants.len(),
        });
        Ok(HeadlessProgram { serial })
    }

    fn create_pipeline(
        &mut self,
        mesh: &HeadlessMesh,
        program: &HeadlessProgram,
        variant: usize,
        setup: &DrawStateSetup,
    ) -> Result<HeadlessPipeline, BackendError> {
        let serial = self.serial("pipeline")?;
        self.log.push(BackendCommand::CreatePipeline {
            pipeline: serial,
            mesh: mesh.serial,
            program: program.serial,
            variant,
            multisample: setup.rasterizer_state.multisample_enabled,
        });
        Ok(HeadlessPipeline { serial })
    }

    fn begin_frame(&mut self) -> bool {
        if self.minimized {
            return false;
        }
        self.log.push(BackendCommand::BeginFrame);
        true
    }

    fn clear(&mut self, clear: &ClearState) {
        self.log.push(BackendCommand::Clear {
            channels: clear.channels,
        });
    }

    fn apply_pipeline(&mut self, pipeline: &HeadlessPipeline, _mesh: &HeadlessMesh) {
        self.log.push(BackendCommand::ApplyPipeline {
            pipeline: pipeline.serial,
        });
    }

    fn apply_uniforms(&mut self, data: &[u8]) -> Result<(), BackendError> {
        self.log.push(BackendCommand::ApplyUniforms { size: data.len() });
        Ok(())
    }

    fn draw(&mut self, mesh: &HeadlessMesh, group: PrimitiveGroup) {
        self.log.push(BackendCommand::Draw {
            mesh: mesh.serial,
            group,
        });
    }

    fn end_frame(&mut self) {
        self.log.push(BackendCommand::EndFrame);
    }

    fn display_attrs(&self) -> DisplayAttrs {
        self.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimized_backend_opens_no_frame() {
        let mut backend = HeadlessBackend::new(&RenderSetup::default());
        backend.set_minimized(true);
        assert!(!backend.begin_frame());
        assert!(backend.log().is_empty());
    }

    #[test]
    fn last_frame_excludes_markers() {
        let mut backend = HeadlessBackend::new(&RenderSetup::default());
        let log = backend.log();

        backend.begin_frame();
        backend.clear(&ClearState::default());
        backend.end_frame();

        assert_eq!(
            log.last_frame(),
            vec![BackendCommand::Clear { channels: PixelChannel::ALL }]
        );
    }

    #[test]
    fn failing_creation_reports_backend_error() {
        let mut backend = HeadlessBackend::new(&RenderSetup::default());
        backend.set_fail_creation(true);
        assert!(backend.create_program(&ProgramSetup::from_source("x")).is_err());
    }

    #[test]
    fn display_follows_setup() {
        let backend = HeadlessBackend::new(&RenderSetup::window(600, 400, true, "t"));
        let attrs = backend.display_attrs();
        assert_eq!((attrs.framebuffer_width, attrs.framebuffer_height), (600, 400));
        assert_eq!(attrs.sample_count, 4);
    }
}
