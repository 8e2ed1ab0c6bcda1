use std::rc::Rc;

use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::render::setup::{
    ClearState, DisplayAttrs, DrawStateSetup, IndexType, MeshSetup, PrimitiveGroup, PrimitiveType,
    ProgramSetup, RenderSetup,
};
use crate::render::state::PixelChannel;
use crate::render::{BackendError, RenderBackend};

use super::context::Gpu;
use super::convert;
use super::surface::SurfaceErrorAction;

struct MeshBuffers {
    vertices: wgpu::Buffer,
    indices: Option<(wgpu::Buffer, wgpu::IndexFormat)>,
    stride: u64,
    attributes: Vec<wgpu::VertexAttribute>,
    primitive_type: PrimitiveType,
    index_type: IndexType,
}

pub struct WgpuMesh(Rc<MeshBuffers>);

struct ShaderVariant {
    module: wgpu::ShaderModule,
    vs_entry: String,
    fs_entry: String,
}

struct ProgramObjects {
    variants: Vec<ShaderVariant>,
    layout: wgpu::PipelineLayout,
    /// Bind group over the uniform ring, one block wide.
    uniforms: Option<wgpu::BindGroup>,
    uniform_block_size: u64,
}

pub struct WgpuProgram(Rc<ProgramObjects>);

struct PipelineObjects {
    pipeline: wgpu::RenderPipeline,
    program: Rc<ProgramObjects>,
    stencil_ref: u32,
}

pub struct WgpuPipeline(Rc<PipelineObjects>);

/// Pipeline state that must be re-issued when a clear starts a new pass.
struct Bound {
    pipeline: Rc<PipelineObjects>,
    mesh: Rc<MeshBuffers>,
    uniform_offset: u32,
}

struct FrameRecording {
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
    pass: Option<wgpu::RenderPass<'static>>,
    cleared: bool,
    bound: Option<Bound>,
}

/// Per-draw uniform blocks for one frame, bound with dynamic offsets.
struct UniformRing {
    buffer: wgpu::Buffer,
    alignment: u64,
    cursor: u64,
}

impl UniformRing {
    fn reserve(&mut self, block_size: u64) -> Result<u64, BackendError> {
        let offset = self.cursor.next_multiple_of(self.alignment);
        if offset + block_size > self.buffer.size() {
            return Err(BackendError::new(format!(
                "uniform buffer exhausted ({} bytes per frame)",
                self.buffer.size()
            )));
        }
        self.cursor = offset + block_size;
        Ok(offset)
    }
}

/// wgpu implementation of [`RenderBackend`] rendering into a window surface.
///
/// Every frame records into a single encoder; clears split it into render
/// passes. `end_frame` submits and presents.
pub struct WgpuBackend {
    gpu: Gpu,
    default_clear: ClearState,
    uniforms: UniformRing,
    frame: Option<FrameRecording>,
    fatal: bool,
    logged_msaa_override: bool,
}

impl WgpuBackend {
    pub fn new(gpu: Gpu, setup: &RenderSetup) -> Self {
        let device = gpu.device();
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prism uniform ring"),
            size: setup.uniform_buffer_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);

        Self {
            gpu,
            default_clear: setup.clear,
            uniforms: UniformRing {
                buffer,
                alignment,
                cursor: 0,
            },
            frame: None,
            fatal: false,
            logged_msaa_override: false,
        }
    }

    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.gpu.resize(size);
    }

    /// Set once the surface reported an unrecoverable error.
    pub fn is_fatal(&self) -> bool {
        self.fatal
    }

    fn ensure_pass(&mut self) {
        let Some(frame) = self.frame.as_mut() else {
            return;
        };
        if frame.pass.is_some() {
            return;
        }
        let clear = (!frame.cleared).then_some(self.default_clear);
        begin_pass(&self.gpu, frame, clear.as_ref());
    }
}

fn load_op<T>(
    clear: Option<&ClearState>,
    channels: PixelChannel,
    value: impl FnOnce(&ClearState) -> T,
) -> wgpu::LoadOp<T> {
    match clear {
        Some(c) if c.channels.intersects(channels) => wgpu::LoadOp::Clear(value(c)),
        _ => wgpu::LoadOp::Load,
    }
}

/// Ends the current pass and opens a new one, re-binding the bound pipeline.
fn begin_pass(gpu: &Gpu, frame: &mut FrameRecording, clear: Option<&ClearState>) {
    drop(frame.pass.take());

    let (view, resolve_target) = match gpu.msaa_view() {
        Some(msaa) => (msaa, Some(&frame.view)),
        None => (&frame.view, None),
    };

    let pass = frame
        .encoder
        .begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("prism pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target,
                ops: wgpu::Operations {
                    load: load_op(clear, PixelChannel::RGBA, |c| wgpu::Color {
                        r: f64::from(c.color[0]),
                        g: f64::from(c.color[1]),
                        b: f64::from(c.color[2]),
                        a: f64::from(c.color[3]),
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: gpu.depth_view(),
                depth_ops: Some(wgpu::Operations {
                    load: load_op(clear, PixelChannel::DEPTH, |c| c.depth),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: load_op(clear, PixelChannel::STENCIL, |c| u32::from(c.stencil)),
                    store: wgpu::StoreOp::Store,
                }),
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
        .forget_lifetime();

    frame.cleared |= clear.is_some();
    frame.pass = Some(pass);

    if let Some(bound) = frame.bound.as_ref() {
        if let Some(pass) = frame.pass.as_mut() {
            bind(pass, bound);
        }
    }
}

fn bind(pass: &mut wgpu::RenderPass<'static>, bound: &Bound) {
    pass.set_pipeline(&bound.pipeline.pipeline);
    pass.set_stencil_reference(bound.pipeline.stencil_ref);
    pass.set_vertex_buffer(0, bound.mesh.vertices.slice(..));
    if let Some((buffer, format)) = bound.mesh.indices.as_ref() {
        pass.set_index_buffer(buffer.slice(..), *format);
    }
    if let Some(group) = bound.pipeline.program.uniforms.as_ref() {
        pass.set_bind_group(0, group, &[bound.uniform_offset]);
    }
}

impl RenderBackend for WgpuBackend {
    type Mesh = WgpuMesh;
    type Program = WgpuProgram;
    type Pipeline = WgpuPipeline;

    fn create_mesh(&mut self, setup: &MeshSetup) -> Result<WgpuMesh, BackendError> {
        let device = self.gpu.device();

        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("prism mesh vbo"),
            contents: &setup.vertex_data,
            usage: wgpu::BufferUsages::VERTEX,
        });

        let indices = convert::index_format(setup.index_type).map(|format| {
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("prism mesh ibo"),
                contents: &setup.index_data,
                usage: wgpu::BufferUsages::INDEX,
            });
            (buffer, format)
        });

        Ok(WgpuMesh(Rc::new(MeshBuffers {
            vertices,
            indices,
            stride: u64::from(setup.layout.byte_size()),
            attributes: convert::vertex_attributes(&setup.layout),
            primitive_type: setup.primitive_type,
            index_type: setup.index_type,
        })))
    }

    fn create_program(&mut self, setup: &ProgramSetup) -> Result<WgpuProgram, BackendError> {
        let device = self.gpu.device();

        let variants = setup
            .variants
            .iter()
            .map(|v| ShaderVariant {
                module: device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some("prism program"),
                    source: wgpu::ShaderSource::Wgsl(v.source.as_str().into()),
                }),
                vs_entry: v.vs_entry.clone(),
                fs_entry: v.fs_entry.clone(),
            })
            .collect();

        let block_size = wgpu::BufferSize::new(setup.uniform_block_size);
        if block_size.is_some() && setup.uniform_block_size > self.uniforms.buffer.size() {
            return Err(BackendError::new(format!(
                "uniform block of {} bytes exceeds the {} byte uniform buffer",
                setup.uniform_block_size,
                self.uniforms.buffer.size()
            )));
        }

        let bind_group_layout = block_size.map(|size| {
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("prism uniform bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: Some(size),
                    },
                    count: None,
                }],
            })
        });

        let uniforms = bind_group_layout.as_ref().map(|layout| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("prism uniform bind group"),
                layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &self.uniforms.buffer,
                        offset: 0,
                        size: block_size,
                    }),
                }],
            })
        });

        let bind_group_layouts: Vec<&wgpu::BindGroupLayout> = bind_group_layout.iter().collect();
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("prism pipeline layout"),
            bind_group_layouts: &bind_group_layouts,
            immediate_size: 0,
        });

        Ok(WgpuProgram(Rc::new(ProgramObjects {
            variants,
            layout,
            uniforms,
            uniform_block_size: setup.uniform_block_size,
        })))
    }

    fn create_pipeline(
        &mut self,
        mesh: &WgpuMesh,
        program: &WgpuProgram,
        variant: usize,
        setup: &DrawStateSetup,
    ) -> Result<WgpuPipeline, BackendError> {
        let shader = program
            .0
            .variants
            .get(variant)
            .ok_or_else(|| BackendError::new(format!("program has no variant {variant}")))?;

        let sample_count = self.gpu.sample_count();
        if sample_count > 1 && !setup.rasterizer_state.multisample_enabled && !self.logged_msaa_override {
            log::debug!(
                "multisample_enabled=false ignored: pipelines match the {sample_count}x render target"
            );
            self.logged_msaa_override = true;
        }

        let rs = &setup.rasterizer_state;
        let mesh = &mesh.0;

        let pipeline = self.gpu.device().create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("prism draw state"),
            layout: Some(&program.0.layout),
            vertex: wgpu::VertexState {
                module: &shader.module,
                entry_point: Some(shader.vs_entry.as_str()),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: mesh.stride,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &mesh.attributes,
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader.module,
                entry_point: Some(shader.fs_entry.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.gpu.surface_format(),
                    blend: convert::blend_state(&setup.blend_state),
                    write_mask: convert::color_writes(setup.blend_state.color_write_mask),
                })],
            }),
            primitive: convert::primitive_state(rs, mesh.primitive_type, mesh.index_type),
            depth_stencil: Some(convert::depth_stencil_state(&setup.depth_stencil_state, rs)),
            multisample: convert::multisample_state(rs, sample_count),
            multiview_mask: None,
            cache: None,
        });

        Ok(WgpuPipeline(Rc::new(PipelineObjects {
            pipeline,
            program: program.0.clone(),
            stencil_ref: u32::from(setup.depth_stencil_state.stencil_ref),
        })))
    }

    fn begin_frame(&mut self) -> bool {
        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 || self.fatal {
            return false;
        }

        let acquired = match self.gpu.acquire() {
            Ok(acquired) => acquired,
            Err(err) => {
                log::debug!("surface texture unavailable: {err}");
                if self.gpu.handle_surface_error(err) == SurfaceErrorAction::Fatal {
                    log::error!("surface error is unrecoverable");
                    self.fatal = true;
                }
                return false;
            }
        };

        let encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("prism frame encoder"),
            });

        self.uniforms.cursor = 0;
        self.frame = Some(FrameRecording {
            surface_texture: acquired.surface_texture,
            view: acquired.view,
            encoder,
            pass: None,
            cleared: false,
            bound: None,
        });
        true
    }

    fn clear(&mut self, clear: &ClearState) {
        if let Some(frame) = self.frame.as_mut() {
            begin_pass(&self.gpu, frame, Some(clear));
        }
    }

    fn apply_pipeline(&mut self, pipeline: &WgpuPipeline, mesh: &WgpuMesh) {
        self.ensure_pass();
        let Some(frame) = self.frame.as_mut() else {
            return;
        };

        let bound = Bound {
            pipeline: pipeline.0.clone(),
            mesh: mesh.0.clone(),
            uniform_offset: 0,
        };
        if let Some(pass) = frame.pass.as_mut() {
            bind(pass, &bound);
        }
        frame.bound = Some(bound);
    }

    fn apply_uniforms(&mut self, data: &[u8]) -> Result<(), BackendError> {
        let frame = self
            .frame
            .as_mut()
            .ok_or_else(|| BackendError::new("uniform upload outside a frame"))?;
        let bound = frame
            .bound
            .as_mut()
            .ok_or_else(|| BackendError::new("uniform upload without an applied pipeline"))?;
        let program = bound.pipeline.program.clone();
        let group = program
            .uniforms
            .as_ref()
            .ok_or_else(|| BackendError::new("program declares no uniform block"))?;

        let offset = self.uniforms.reserve(program.uniform_block_size)?;
        let dynamic_offset = u32::try_from(offset)
            .map_err(|_| BackendError::new("uniform offset exceeds u32"))?;
        self.gpu.queue().write_buffer(&self.uniforms.buffer, offset, data);

        bound.uniform_offset = dynamic_offset;
        if let Some(pass) = frame.pass.as_mut() {
            pass.set_bind_group(0, group, &[dynamic_offset]);
        }
        Ok(())
    }

    fn draw(&mut self, mesh: &WgpuMesh, group: PrimitiveGroup) {
        let Some(pass) = self.frame.as_mut().and_then(|f| f.pass.as_mut()) else {
            return;
        };
        let Some(end) = group.end() else {
            return;
        };
        let range = group.base_element..end;
        if mesh.0.indices.is_some() {
            pass.draw_indexed(range, 0, 0..1);
        } else {
            pass.draw(range, 0..1);
        }
    }

    fn end_frame(&mut self) {
        self.ensure_pass();
        let Some(mut frame) = self.frame.take() else {
            return;
        };
        drop(frame.pass.take());

        self.gpu.queue().submit(std::iter::once(frame.encoder.finish()));
        self.gpu.window().pre_present_notify();
        frame.surface_texture.present();
    }

    fn display_attrs(&self) -> DisplayAttrs {
        let size = self.gpu.size();
        DisplayAttrs {
            framebuffer_width: size.width,
            framebuffer_height: size.height,
            sample_count: self.gpu.sample_count(),
        }
    }
}
