/// Comparison used by the depth test and the stencil test.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum CompareFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    #[default]
    Always,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum StencilOp {
    #[default]
    Keep,
    Zero,
    Replace,
    IncrClamp,
    DecrClamp,
    Invert,
    IncrWrap,
    DecrWrap,
}

/// Stencil behavior for one face orientation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct StencilState {
    pub fail_op: StencilOp,
    pub depth_fail_op: StencilOp,
    pub pass_op: StencilOp,
    pub cmp_func: CompareFunc,
}

/// Fixed-function depth and stencil testing.
///
/// Defaults: depth test passes always, depth writes off, stencil off with
/// full read/write masks and a zero reference value.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct DepthStencilState {
    pub stencil_front: StencilState,
    pub stencil_back: StencilState,
    pub depth_cmp_func: CompareFunc,
    pub depth_write_enabled: bool,
    pub stencil_enabled: bool,
    pub stencil_read_mask: u8,
    pub stencil_write_mask: u8,
    pub stencil_ref: u8,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            stencil_front: StencilState::default(),
            stencil_back: StencilState::default(),
            depth_cmp_func: CompareFunc::Always,
            depth_write_enabled: false,
            stencil_enabled: false,
            stencil_read_mask: 0xFF,
            stencil_write_mask: 0xFF,
            stencil_ref: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_leave_depth_untouched() {
        let s = DepthStencilState::default();
        assert_eq!(s.depth_cmp_func, CompareFunc::Always);
        assert!(!s.depth_write_enabled);
        assert!(!s.stencil_enabled);
        assert_eq!(s.stencil_read_mask, 0xFF);
        assert_eq!(s.stencil_write_mask, 0xFF);
        assert_eq!(s.stencil_ref, 0);
    }

    #[test]
    fn stencil_faces_default_to_keep_always() {
        let face = DepthStencilState::default().stencil_front;
        assert_eq!(face.fail_op, StencilOp::Keep);
        assert_eq!(face.depth_fail_op, StencilOp::Keep);
        assert_eq!(face.pass_op, StencilOp::Keep);
        assert_eq!(face.cmp_func, CompareFunc::Always);
    }
}
