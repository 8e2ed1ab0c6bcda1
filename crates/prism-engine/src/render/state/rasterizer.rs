/// Triangle face selected for culling.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Face {
    Front,
    #[default]
    Back,
}

/// Fixed-function rasterizer toggles.
///
/// Defaults: no culling (back faces when enabled), no depth offset, no
/// scissor test, dithering on, alpha-to-coverage off, multisampling off.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RasterizerState {
    pub cull_face_enabled: bool,
    pub cull_face: Face,
    pub depth_offset_enabled: bool,
    pub scissor_test_enabled: bool,
    pub dither_enabled: bool,
    pub alpha_to_coverage_enabled: bool,
    pub multisample_enabled: bool,
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self {
            cull_face_enabled: false,
            cull_face: Face::Back,
            depth_offset_enabled: false,
            scissor_test_enabled: false,
            dither_enabled: true,
            alpha_to_coverage_enabled: false,
            multisample_enabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = RasterizerState::default();
        assert!(!s.cull_face_enabled);
        assert_eq!(s.cull_face, Face::Back);
        assert!(!s.depth_offset_enabled);
        assert!(!s.scissor_test_enabled);
        assert!(s.dither_enabled);
        assert!(!s.alpha_to_coverage_enabled);
        assert!(!s.multisample_enabled);
    }
}
