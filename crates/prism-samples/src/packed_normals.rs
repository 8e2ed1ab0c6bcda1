use anyhow::Context;
use glam::{Mat4, Vec3};
use prism_engine::core::{App, AppControl};
use prism_engine::render::setup::{ClearState, DrawStateSetup, ProgramSetup};
use prism_engine::render::state::{CompareFunc, PixelChannel};
use prism_engine::render::{RenderBackend, RenderManager};
use prism_engine::resource::ResourceId;

use crate::shapes::ShapeBuilder;

const SHADER: &str = include_str!("shaders/packed_normals.wgsl");

/// Shape positions, drawn in primitive group order.
const POSITIONS: [Vec3; 5] = [
    Vec3::new(-1.0, 1.0, -6.0),
    Vec3::new(1.0, 1.0, -6.0),
    Vec3::new(-2.0, -1.0, -6.0),
    Vec3::new(2.0, -1.0, -6.0),
    Vec3::new(0.0, -1.0, -6.0),
];

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Params {
    pub mvp: Mat4,
}

struct DrawStates {
    msaa: ResourceId,
    no_msaa: ResourceId,
}

/// Five shapes with `Byte4N` normals; even groups use the multisampled draw
/// state, odd ones the non-multisampled one.
#[derive(Default)]
pub struct PackedNormals {
    draw_states: Option<DrawStates>,
    proj: Mat4,
    view: Mat4,
    angle_x: f32,
    angle_y: f32,
}

impl PackedNormals {
    pub fn new() -> Self {
        Self::default()
    }

    fn mvp(&self, pos: Vec3) -> Mat4 {
        let model = Mat4::from_translation(pos)
            * Mat4::from_rotation_x(self.angle_x)
            * Mat4::from_rotation_y(self.angle_y);
        self.proj * self.view * model
    }
}

impl<B: RenderBackend> App<B> for PackedNormals {
    fn on_init(&mut self, render: &mut RenderManager<B>) -> anyhow::Result<()> {
        let mut shapes = ShapeBuilder::new();
        shapes
            .cuboid(1.0, 1.0, 1.0, 4)
            .sphere(0.75, 36, 20)
            .cylinder(0.5, 1.5, 36, 10)
            .torus(0.3, 0.5, 20, 36)
            .plane(1.5, 1.5, 10);

        let mesh = render
            .create_resource(&shapes.build()?)
            .context("creating shape mesh")?;
        let prog = render
            .create_resource(&ProgramSetup::from_source(SHADER).with_uniform_block::<Params>())
            .context("creating packed-normals program")?;

        let mut dss = DrawStateSetup::from_mesh_and_prog(mesh, prog, 0);
        dss.depth_stencil_state.depth_write_enabled = true;
        dss.depth_stencil_state.depth_cmp_func = CompareFunc::LessEqual;
        dss.rasterizer_state.cull_face_enabled = true;
        dss.rasterizer_state.multisample_enabled = true;
        let msaa = render.create_resource(&dss)?;
        dss.rasterizer_state.multisample_enabled = false;
        let no_msaa = render.create_resource(&dss)?;

        // The draw states keep what they need alive.
        render.release_resource(mesh)?;
        render.release_resource(prog)?;

        let attrs = render.display_attrs();
        self.proj = Mat4::perspective_rh(45f32.to_radians(), attrs.aspect_ratio(), 0.01, 100.0);
        self.view = Mat4::IDENTITY;
        self.draw_states = Some(DrawStates { msaa, no_msaa });

        log::info!(
            "packed normals ready ({}x{}, {} samples)",
            attrs.framebuffer_width,
            attrs.framebuffer_height,
            attrs.sample_count
        );
        Ok(())
    }

    fn on_running(&mut self, render: &mut RenderManager<B>) -> anyhow::Result<AppControl> {
        let Some(DrawStates { msaa, no_msaa }) = self.draw_states else {
            anyhow::bail!("draw states missing");
        };

        if render.begin_frame()? {
            self.angle_y += 0.01;
            self.angle_x += 0.02;

            render.apply_draw_state(msaa)?;
            render.clear(&ClearState {
                channels: PixelChannel::ALL,
                color: [0.0; 4],
                depth: 1.0,
                stencil: 0,
            })?;

            for (group, pos) in POSITIONS.into_iter().enumerate() {
                let draw_state = if group % 2 == 0 { msaa } else { no_msaa };
                render.apply_draw_state(draw_state)?;
                render.apply_uniforms(&Params { mvp: self.mvp(pos) })?;
                render.draw(group)?;
            }

            render.end_frame()?;
        }

        Ok(if render.quit_requested() {
            AppControl::Exit
        } else {
            AppControl::Continue
        })
    }

    fn on_cleanup(&mut self, render: &mut RenderManager<B>) -> anyhow::Result<()> {
        if let Some(ds) = self.draw_states.take() {
            render.release_resource(ds.msaa)?;
            render.release_resource(ds.no_msaa)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_engine::core::HeadlessRuntime;
    use prism_engine::render::headless::BackendCommand;
    use prism_engine::render::setup::RenderSetup;

    fn setup() -> RenderSetup {
        RenderSetup::window(600, 400, true, "packed normals test")
    }

    #[test]
    fn runs_headless_and_cleans_up() {
        let log = HeadlessRuntime::run(setup(), PackedNormals::new(), 3).unwrap();
        let commands = log.snapshot();

        let frames = commands.iter().filter(|c| **c == BackendCommand::EndFrame).count();
        assert_eq!(frames, 3);

        let pipelines: Vec<bool> = commands
            .iter()
            .filter_map(|c| match c {
                BackendCommand::CreatePipeline { multisample, .. } => Some(*multisample),
                _ => None,
            })
            .collect();
        assert_eq!(pipelines, vec![true, false]);
    }

    #[test]
    fn each_frame_draws_five_groups_alternating_states() {
        let log = HeadlessRuntime::run(setup(), PackedNormals::new(), 1).unwrap();
        let frame = log.last_frame();

        let draws: Vec<u32> = frame
            .iter()
            .filter_map(|c| match c {
                BackendCommand::Draw { group, .. } => Some(group.base_element),
                _ => None,
            })
            .collect();
        assert_eq!(draws.len(), 5);
        assert!(draws.windows(2).all(|w| w[0] < w[1]));

        let applied: Vec<u64> = frame
            .iter()
            .filter_map(|c| match c {
                BackendCommand::ApplyPipeline { pipeline } => Some(*pipeline),
                _ => None,
            })
            .collect();
        // The first apply precedes the clear.
        assert_eq!(applied.len(), 6);
        assert_eq!(applied[1], applied[3]);
        assert_ne!(applied[1], applied[2]);

        let uploads = frame
            .iter()
            .filter(|c| matches!(c, BackendCommand::ApplyUniforms { size: 64 }))
            .count();
        assert_eq!(uploads, 5);
    }

    #[test]
    fn mvp_moves_shapes_in_front_of_the_camera() {
        let mut app = PackedNormals::new();
        app.proj = Mat4::perspective_rh(45f32.to_radians(), 1.5, 0.01, 100.0);
        app.view = Mat4::IDENTITY;

        let clip = app.mvp(POSITIONS[4]) * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(clip.w > 0.0);
        assert!((0.0..=1.0).contains(&ndc.z));
    }
}
