use crate::gpu::GpuInit;
use crate::render::state::PixelChannel;

/// Values written by `RenderManager::clear`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClearState {
    pub channels: PixelChannel,
    pub color: [f32; 4],
    pub depth: f32,
    pub stencil: u8,
}

impl Default for ClearState {
    fn default() -> Self {
        Self {
            channels: PixelChannel::ALL,
            color: [0.0, 0.0, 0.0, 1.0],
            depth: 1.0,
            stencil: 0,
        }
    }
}

/// Render system configuration.
///
/// Passed once to `RenderManager::new`; nothing here can change afterwards
/// except the framebuffer size, which follows the window.
#[derive(Debug, Clone)]
pub struct RenderSetup {
    pub title: String,
    /// Initial window size in logical pixels.
    pub width: u32,
    pub height: u32,
    /// MSAA sample count of the default render target (1 or 4).
    pub sample_count: u32,
    /// Clear applied at the start of each frame before any user clear.
    pub clear: ClearState,

    pub mesh_pool_size: usize,
    pub program_pool_size: usize,
    pub draw_state_pool_size: usize,

    /// Bytes reserved per frame for per-draw uniform blocks.
    pub uniform_buffer_size: u64,

    pub gpu: GpuInit,
}

impl RenderSetup {
    pub const DEFAULT_POOL_SIZE: usize = 128;

    /// Windowed setup; `msaa` selects a 4x multisampled default render target.
    pub fn window(width: u32, height: u32, msaa: bool, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            sample_count: if msaa { 4 } else { 1 },
            ..Self::default()
        }
    }
}

impl Default for RenderSetup {
    fn default() -> Self {
        Self {
            title: "prism".to_owned(),
            width: 1024,
            height: 768,
            sample_count: 1,
            clear: ClearState::default(),
            mesh_pool_size: Self::DEFAULT_POOL_SIZE,
            program_pool_size: Self::DEFAULT_POOL_SIZE,
            draw_state_pool_size: Self::DEFAULT_POOL_SIZE,
            uniform_buffer_size: 64 * 1024,
            gpu: GpuInit::default(),
        }
    }
}

/// Current properties of the default render target.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DisplayAttrs {
    pub framebuffer_width: u32,
    pub framebuffer_height: u32,
    pub sample_count: u32,
}

impl DisplayAttrs {
    pub fn aspect_ratio(&self) -> f32 {
        self.framebuffer_width.max(1) as f32 / self.framebuffer_height.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_selects_msaa_sample_count() {
        assert_eq!(RenderSetup::window(600, 400, true, "t").sample_count, 4);
        assert_eq!(RenderSetup::window(600, 400, false, "t").sample_count, 1);
    }

    #[test]
    fn window_keeps_default_pools() {
        let setup = RenderSetup::window(600, 400, true, "t");
        assert_eq!(setup.title, "t");
        assert_eq!(setup.draw_state_pool_size, RenderSetup::DEFAULT_POOL_SIZE);
    }

    #[test]
    fn clear_defaults_to_all_channels() {
        let clear = ClearState::default();
        assert_eq!(clear.channels, PixelChannel::ALL);
        assert_eq!(clear.depth, 1.0);
    }

    #[test]
    fn aspect_ratio_survives_zero_height() {
        let attrs = DisplayAttrs { framebuffer_width: 600, framebuffer_height: 0, sample_count: 1 };
        assert_eq!(attrs.aspect_ratio(), 600.0);
    }
}
