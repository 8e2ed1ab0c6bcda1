use std::rc::Rc;

use crate::resource::{Locator, ResourceId, ResourcePool, ResourceRegistry, ResourceType};

use super::backend::RenderBackend;
use super::error::{RenderError, Result};
use super::frame::FrameState;
use super::setup::{
    ClearState, DisplayAttrs, DrawStateSetup, MeshSetup, PrimitiveGroup, ProgramSetup, RenderSetup,
    variant_index,
};

struct LiveMesh<M> {
    primitive_groups: Vec<PrimitiveGroup>,
    raw: M,
}

struct LiveProgram<P> {
    variant_masks: Vec<u32>,
    uniform_block_size: u64,
    raw: P,
}

/// A live draw state keeps its mesh and program alive on its own; releasing
/// their ids only removes them from the pools.
struct LiveDrawState<B: RenderBackend> {
    setup: DrawStateSetup,
    mesh: Rc<LiveMesh<B::Mesh>>,
    program: Rc<LiveProgram<B::Program>>,
    variant: usize,
    pipeline: B::Pipeline,
}

/// Setup objects accepted by [`RenderManager::create_resource`].
pub trait ResourceSetup {
    fn create_in<B: RenderBackend>(&self, render: &mut RenderManager<B>) -> Result<ResourceId>;
}

impl ResourceSetup for MeshSetup {
    fn create_in<B: RenderBackend>(&self, render: &mut RenderManager<B>) -> Result<ResourceId> {
        render.create_mesh(self)
    }
}

impl ResourceSetup for ProgramSetup {
    fn create_in<B: RenderBackend>(&self, render: &mut RenderManager<B>) -> Result<ResourceId> {
        render.create_program(self)
    }
}

impl ResourceSetup for DrawStateSetup {
    fn create_in<B: RenderBackend>(&self, render: &mut RenderManager<B>) -> Result<ResourceId> {
        render.create_draw_state(self)
    }
}

/// Owns every live render resource and the frame-boundary state.
///
/// Construct one per process at startup and pass it by `&mut` to whatever
/// needs to create, apply or release resources. `discard()` tears everything
/// down at shutdown.
///
/// Ordering rules:
/// - `create_resource` / `release_resource` are valid at any time
/// - `apply_draw_state`, `clear`, `apply_uniforms` and `draw` only between
///   `begin_frame` and `end_frame`
/// - exactly one draw state is bound at a time; `end_frame` unbinds it
///
/// The manager holds `Rc`s and is therefore confined to the thread that
/// runs the frame loop.
pub struct RenderManager<B: RenderBackend> {
    setup: RenderSetup,
    backend: B,

    meshes: ResourcePool<Rc<LiveMesh<B::Mesh>>>,
    programs: ResourcePool<Rc<LiveProgram<B::Program>>>,
    draw_states: ResourcePool<LiveDrawState<B>>,
    registry: ResourceRegistry,

    frame: FrameState,
    bound: Option<ResourceId>,
    frame_count: u64,
    quit_requested: bool,
}

impl<B: RenderBackend> RenderManager<B> {
    pub fn new(setup: RenderSetup, backend: B) -> Self {
        log::debug!(
            "render manager set up ({}x{}, {} sample(s))",
            setup.width,
            setup.height,
            setup.sample_count
        );

        Self {
            meshes: ResourcePool::new(ResourceType::Mesh, setup.mesh_pool_size),
            programs: ResourcePool::new(ResourceType::Program, setup.program_pool_size),
            draw_states: ResourcePool::new(ResourceType::DrawState, setup.draw_state_pool_size),
            registry: ResourceRegistry::new(),
            setup,
            backend,
            frame: FrameState::OutsideFrame,
            bound: None,
            frame_count: 0,
            quit_requested: false,
        }
    }

    pub fn setup(&self) -> &RenderSetup {
        &self.setup
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn display_attrs(&self) -> DisplayAttrs {
        self.backend.display_attrs()
    }

    pub fn frame_state(&self) -> FrameState {
        self.frame
    }

    /// Number of frames completed with `end_frame`.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    // ── creation ──────────────────────────────────────────────────────────

    /// Creates a resource from any setup object and returns its handle.
    pub fn create_resource<S: ResourceSetup>(&mut self, setup: &S) -> Result<ResourceId> {
        setup.create_in(self)
    }

    pub fn create_mesh(&mut self, setup: &MeshSetup) -> Result<ResourceId> {
        if let Some(id) = self.acquire_shared(ResourceType::Mesh, &setup.locator) {
            return Ok(id);
        }

        setup.validate().map_err(|reason| RenderError::InvalidSetup {
            kind: ResourceType::Mesh,
            reason,
        })?;
        ensure_capacity(&self.meshes)?;

        let raw = self.backend.create_mesh(setup)?;
        let live = Rc::new(LiveMesh {
            primitive_groups: setup.primitive_groups.clone(),
            raw,
        });

        let id = alloc(&mut self.meshes, live)?;
        self.registry.add(&setup.locator, id);

        log::debug!(
            "created {id} ({} vertices, {} primitive groups)",
            setup.num_vertices,
            setup.primitive_groups.len()
        );
        Ok(id)
    }

    pub fn create_program(&mut self, setup: &ProgramSetup) -> Result<ResourceId> {
        if let Some(id) = self.acquire_shared(ResourceType::Program, &setup.locator) {
            return Ok(id);
        }

        setup.validate().map_err(|reason| RenderError::InvalidSetup {
            kind: ResourceType::Program,
            reason,
        })?;
        ensure_capacity(&self.programs)?;

        let raw = self.backend.create_program(setup)?;
        let live = Rc::new(LiveProgram {
            variant_masks: setup.variant_masks(),
            uniform_block_size: setup.uniform_block_size,
            raw,
        });

        let id = alloc(&mut self.programs, live)?;
        self.registry.add(&setup.locator, id);

        log::debug!("created {id} ({} variant(s))", setup.variants.len());
        Ok(id)
    }

    /// Validates the mesh/program references and the selection mask, then
    /// creates the pipeline. Nothing is allocated when any step fails.
    ///
    /// References are checked before a shared locator is reused, so a shared
    /// draw state cannot be acquired through a released mesh or program.
    pub fn create_draw_state(&mut self, setup: &DrawStateSetup) -> Result<ResourceId> {
        let mesh = self
            .meshes
            .get(setup.mesh)
            .cloned()
            .ok_or(RenderError::DependencyNotFound {
                kind: ResourceType::Mesh,
                id: setup.mesh,
            })?;
        let program = self
            .programs
            .get(setup.program)
            .cloned()
            .ok_or(RenderError::DependencyNotFound {
                kind: ResourceType::Program,
                id: setup.program,
            })?;

        let variant = variant_index(&program.variant_masks, setup.program_selection_mask).ok_or(
            RenderError::InvalidVariant {
                program: setup.program,
                mask: setup.program_selection_mask,
            },
        )?;

        if let Some(id) = self.acquire_shared(ResourceType::DrawState, &setup.locator) {
            return Ok(id);
        }

        ensure_capacity(&self.draw_states)?;

        let pipeline = self
            .backend
            .create_pipeline(&mesh.raw, &program.raw, variant, setup)?;

        let id = alloc(
            &mut self.draw_states,
            LiveDrawState {
                setup: setup.clone(),
                mesh,
                program,
                variant,
                pipeline,
            },
        )?;
        self.registry.add(&setup.locator, id);

        log::debug!(
            "created {id} (mesh {}, program {}, variant {variant})",
            setup.mesh,
            setup.program
        );
        Ok(id)
    }

    fn acquire_shared(&mut self, ty: ResourceType, locator: &Locator) -> Option<ResourceId> {
        let id = self.registry.acquire(ty, locator)?;
        log::debug!(
            "reusing shared {id} for '{}'",
            locator.location().unwrap_or_default()
        );
        Some(id)
    }

    // ── lookup ────────────────────────────────────────────────────────────

    /// Finds a live resource created with the shared `locator`.
    pub fn lookup_resource(&self, ty: ResourceType, locator: &Locator) -> Option<ResourceId> {
        self.registry.lookup(ty, locator)
    }

    /// True while `id` refers to a live resource of this manager.
    pub fn is_valid(&self, id: ResourceId) -> bool {
        match id.ty() {
            ResourceType::Mesh => self.meshes.contains(id),
            ResourceType::Program => self.programs.contains(id),
            ResourceType::DrawState => self.draw_states.contains(id),
        }
    }

    pub fn live_count(&self, ty: ResourceType) -> usize {
        match ty {
            ResourceType::Mesh => self.meshes.len(),
            ResourceType::Program => self.programs.len(),
            ResourceType::DrawState => self.draw_states.len(),
        }
    }

    pub fn live_resource_count(&self) -> usize {
        self.meshes.len() + self.programs.len() + self.draw_states.len()
    }

    /// The descriptor a live draw state was created from.
    pub fn draw_state_setup(&self, id: ResourceId) -> Result<&DrawStateSetup> {
        self.draw_states
            .get(id)
            .map(|ds| &ds.setup)
            .ok_or(RenderError::InvalidHandle {
                id,
                op: "draw_state_setup",
            })
    }

    /// Currently bound draw state, if any.
    pub fn bound_draw_state(&self) -> Option<ResourceId> {
        self.bound
    }

    // ── release ───────────────────────────────────────────────────────────

    /// Releases one use of `id`; the resource is destroyed with its last use.
    ///
    /// Releasing an id that is not live is an error, not a no-op.
    pub fn release_resource(&mut self, id: ResourceId) -> Result<()> {
        if !self.is_valid(id) {
            return Err(RenderError::InvalidHandle {
                id,
                op: "release_resource",
            });
        }

        if let Some(remaining) = self.registry.release(id) {
            if remaining > 0 {
                log::debug!("released one use of {id} ({remaining} remaining)");
                return Ok(());
            }
        }

        self.destroy(id);
        log::debug!("destroyed {id}");
        Ok(())
    }

    fn destroy(&mut self, id: ResourceId) {
        match id.ty() {
            ResourceType::Mesh => drop(self.meshes.remove(id)),
            ResourceType::Program => drop(self.programs.remove(id)),
            ResourceType::DrawState => {
                if self.bound == Some(id) {
                    self.bound = None;
                }
                drop(self.draw_states.remove(id));
            }
        }
    }

    /// Destroys every live resource regardless of outstanding uses.
    ///
    /// Every id issued so far becomes invalid. An open frame is ended first.
    /// The manager stays usable afterwards.
    pub fn discard(&mut self) {
        if self.frame.is_inside() {
            log::warn!("discard called inside a frame; ending frame");
            self.backend.end_frame();
            self.frame = FrameState::OutsideFrame;
        }

        let count = self.live_resource_count();
        self.bound = None;

        // Draw states first: they hold the last references to released meshes/programs.
        self.draw_states.clear();
        self.programs.clear();
        self.meshes.clear();
        self.registry.clear();

        log::info!("render manager discarded {count} live resource(s)");
    }

    // ── frame ─────────────────────────────────────────────────────────────

    /// Opens a frame. `Ok(false)` means the backend cannot render right now
    /// and the manager stays outside a frame.
    pub fn begin_frame(&mut self) -> Result<bool> {
        self.frame.require_outside("begin_frame")?;

        if !self.backend.begin_frame() {
            return Ok(false);
        }

        self.frame = FrameState::InsideFrame;
        Ok(true)
    }

    pub fn end_frame(&mut self) -> Result<()> {
        self.frame.require_inside("end_frame")?;

        self.backend.end_frame();
        self.frame = FrameState::OutsideFrame;
        self.bound = None;
        self.frame_count += 1;
        Ok(())
    }

    pub fn clear(&mut self, clear: &ClearState) -> Result<()> {
        self.frame.require_inside("clear")?;
        self.backend.clear(clear);
        Ok(())
    }

    /// Binds the draw state as current pipeline state, replacing the previous binding.
    pub fn apply_draw_state(&mut self, id: ResourceId) -> Result<()> {
        let ds = self.draw_states.get(id).ok_or(RenderError::InvalidHandle {
            id,
            op: "apply_draw_state",
        })?;
        self.frame.require_inside("apply_draw_state")?;

        self.backend.apply_pipeline(&ds.pipeline, &ds.mesh.raw);
        self.bound = Some(id);
        Ok(())
    }

    /// Uploads the uniform block consumed by the bound draw state's program.
    pub fn apply_uniforms<T: bytemuck::Pod>(&mut self, block: &T) -> Result<()> {
        self.frame.require_inside("apply_uniforms")?;
        let id = self.bound.unwrap_or_default();
        let ds = self.draw_states.get(id).ok_or(RenderError::InvalidHandle {
            id,
            op: "apply_uniforms",
        })?;

        let data = bytemuck::bytes_of(block);
        if data.len() as u64 > ds.program.uniform_block_size {
            return Err(RenderError::InvalidUniformBlock {
                program: ds.setup.program,
                size: data.len(),
                capacity: ds.program.uniform_block_size,
            });
        }

        self.backend.apply_uniforms(data)?;
        Ok(())
    }

    /// Draws primitive group `group_index` of the bound draw state's mesh.
    pub fn draw(&mut self, group_index: usize) -> Result<()> {
        self.frame.require_inside("draw")?;
        let id = self.bound.unwrap_or_default();
        let ds = self
            .draw_states
            .get(id)
            .ok_or(RenderError::InvalidHandle { id, op: "draw" })?;

        let group = ds.mesh.primitive_groups.get(group_index).copied().ok_or(
            RenderError::PrimitiveGroupOutOfRange {
                mesh: ds.setup.mesh,
                index: group_index,
                count: ds.mesh.primitive_groups.len(),
            },
        )?;

        self.backend.draw(&ds.mesh.raw, group);
        Ok(())
    }

    /// Variant index a live draw state resolved its selection mask to.
    pub fn draw_state_variant(&self, id: ResourceId) -> Result<usize> {
        self.draw_states
            .get(id)
            .map(|ds| ds.variant)
            .ok_or(RenderError::InvalidHandle {
                id,
                op: "draw_state_variant",
            })
    }
}

impl<B: RenderBackend> Drop for RenderManager<B> {
    fn drop(&mut self) {
        let count = self.live_resource_count();
        if count > 0 {
            log::warn!("render manager dropped with {count} live resource(s); discarding");
            self.discard();
        }
    }
}

fn ensure_capacity<T>(pool: &ResourcePool<T>) -> Result<()> {
    if pool.is_full() {
        return Err(RenderError::PoolExhausted {
            kind: pool.ty(),
            capacity: pool.capacity(),
        });
    }
    Ok(())
}

fn alloc<T>(pool: &mut ResourcePool<T>, value: T) -> Result<ResourceId> {
    let kind = pool.ty();
    let capacity = pool.capacity();
    pool.alloc(value)
        .map_err(|_| RenderError::PoolExhausted { kind, capacity })
}
