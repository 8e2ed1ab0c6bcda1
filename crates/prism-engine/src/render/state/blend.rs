/// Source/destination weighting in the blend equation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
    OneMinusDstColor,
    DstAlpha,
    OneMinusDstAlpha,
    SrcAlphaSaturated,
    BlendColor,
    OneMinusBlendColor,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendOperation {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

bitflags::bitflags! {
    /// Bit set of render-target channels.
    ///
    /// Used as the color write mask of a blend state and as the channel
    /// selection of a clear. Depth and stencil bits are ignored by the write mask.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    pub struct PixelChannel: u8 {
        const R = 1 << 0;
        const G = 1 << 1;
        const B = 1 << 2;
        const A = 1 << 3;
        const DEPTH = 1 << 4;
        const STENCIL = 1 << 5;

        const RGB = Self::R.bits() | Self::G.bits() | Self::B.bits();
        const RGBA = Self::RGB.bits() | Self::A.bits();
        const DEPTH_STENCIL = Self::DEPTH.bits() | Self::STENCIL.bits();
        const ALL = Self::RGBA.bits() | Self::DEPTH_STENCIL.bits();
    }
}

/// Fixed-function blending.
///
/// Defaults: blending disabled, `One * src + Zero * dst` for both color and
/// alpha, all color channels written.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BlendState {
    pub blend_enabled: bool,
    pub src_factor_rgb: BlendFactor,
    pub dst_factor_rgb: BlendFactor,
    pub op_rgb: BlendOperation,
    pub src_factor_alpha: BlendFactor,
    pub dst_factor_alpha: BlendFactor,
    pub op_alpha: BlendOperation,
    pub color_write_mask: PixelChannel,
}

impl Default for BlendState {
    fn default() -> Self {
        Self {
            blend_enabled: false,
            src_factor_rgb: BlendFactor::One,
            dst_factor_rgb: BlendFactor::Zero,
            op_rgb: BlendOperation::Add,
            src_factor_alpha: BlendFactor::One,
            dst_factor_alpha: BlendFactor::Zero,
            op_alpha: BlendOperation::Add,
            color_write_mask: PixelChannel::RGBA,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_disable_blending_and_write_all_colors() {
        let s = BlendState::default();
        assert!(!s.blend_enabled);
        assert_eq!(s.src_factor_rgb, BlendFactor::One);
        assert_eq!(s.dst_factor_rgb, BlendFactor::Zero);
        assert_eq!(s.op_rgb, BlendOperation::Add);
        assert_eq!(s.color_write_mask, PixelChannel::RGBA);
    }

    #[test]
    fn channel_sets_compose() {
        let rg = PixelChannel::R | PixelChannel::G;
        assert!(rg.contains(PixelChannel::R));
        assert!(!rg.contains(PixelChannel::RGB));
        assert!(PixelChannel::ALL.contains(PixelChannel::DEPTH_STENCIL));
        assert!(!PixelChannel::RGBA.intersects(PixelChannel::DEPTH));
        assert_eq!(PixelChannel::ALL & PixelChannel::RGBA, PixelChannel::RGBA);
        assert_eq!(PixelChannel::ALL, PixelChannel::all());
    }
}
