//! Fixed-function state blocks to wgpu pipeline state.

use crate::render::setup::{IndexType, PrimitiveType, VertexFormat, VertexLayout};
use crate::render::state::{
    BlendFactor, BlendOperation, BlendState, CompareFunc, DepthStencilState, Face, PixelChannel,
    RasterizerState, StencilOp, StencilState,
};

use super::context::DEPTH_FORMAT;

pub(crate) fn blend_factor(f: BlendFactor) -> wgpu::BlendFactor {
    match f {
        BlendFactor::Zero => wgpu::BlendFactor::Zero,
        BlendFactor::One => wgpu::BlendFactor::One,
        BlendFactor::SrcColor => wgpu::BlendFactor::Src,
        BlendFactor::OneMinusSrcColor => wgpu::BlendFactor::OneMinusSrc,
        BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
        BlendFactor::DstColor => wgpu::BlendFactor::Dst,
        BlendFactor::OneMinusDstColor => wgpu::BlendFactor::OneMinusDst,
        BlendFactor::DstAlpha => wgpu::BlendFactor::DstAlpha,
        BlendFactor::OneMinusDstAlpha => wgpu::BlendFactor::OneMinusDstAlpha,
        BlendFactor::SrcAlphaSaturated => wgpu::BlendFactor::SrcAlphaSaturated,
        BlendFactor::BlendColor => wgpu::BlendFactor::Constant,
        BlendFactor::OneMinusBlendColor => wgpu::BlendFactor::OneMinusConstant,
    }
}

fn blend_operation(op: BlendOperation) -> wgpu::BlendOperation {
    match op {
        BlendOperation::Add => wgpu::BlendOperation::Add,
        BlendOperation::Subtract => wgpu::BlendOperation::Subtract,
        BlendOperation::ReverseSubtract => wgpu::BlendOperation::ReverseSubtract,
        BlendOperation::Min => wgpu::BlendOperation::Min,
        BlendOperation::Max => wgpu::BlendOperation::Max,
    }
}

/// `None` when blending is disabled (replace).
pub(crate) fn blend_state(bs: &BlendState) -> Option<wgpu::BlendState> {
    if !bs.blend_enabled {
        return None;
    }

    // wgpu requires factor One for min/max.
    let component = |src, dst, op| {
        let operation = blend_operation(op);
        match operation {
            wgpu::BlendOperation::Min | wgpu::BlendOperation::Max => wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation,
            },
            _ => wgpu::BlendComponent {
                src_factor: blend_factor(src),
                dst_factor: blend_factor(dst),
                operation,
            },
        }
    };

    Some(wgpu::BlendState {
        color: component(bs.src_factor_rgb, bs.dst_factor_rgb, bs.op_rgb),
        alpha: component(bs.src_factor_alpha, bs.dst_factor_alpha, bs.op_alpha),
    })
}

pub(crate) fn color_writes(mask: PixelChannel) -> wgpu::ColorWrites {
    let mut writes = wgpu::ColorWrites::empty();
    for (channel, write) in [
        (PixelChannel::R, wgpu::ColorWrites::RED),
        (PixelChannel::G, wgpu::ColorWrites::GREEN),
        (PixelChannel::B, wgpu::ColorWrites::BLUE),
        (PixelChannel::A, wgpu::ColorWrites::ALPHA),
    ] {
        if mask.contains(channel) {
            writes |= write;
        }
    }
    writes
}

pub(crate) fn compare_function(f: CompareFunc) -> wgpu::CompareFunction {
    match f {
        CompareFunc::Never => wgpu::CompareFunction::Never,
        CompareFunc::Less => wgpu::CompareFunction::Less,
        CompareFunc::Equal => wgpu::CompareFunction::Equal,
        CompareFunc::LessEqual => wgpu::CompareFunction::LessEqual,
        CompareFunc::Greater => wgpu::CompareFunction::Greater,
        CompareFunc::NotEqual => wgpu::CompareFunction::NotEqual,
        CompareFunc::GreaterEqual => wgpu::CompareFunction::GreaterEqual,
        CompareFunc::Always => wgpu::CompareFunction::Always,
    }
}

fn stencil_operation(op: StencilOp) -> wgpu::StencilOperation {
    match op {
        StencilOp::Keep => wgpu::StencilOperation::Keep,
        StencilOp::Zero => wgpu::StencilOperation::Zero,
        StencilOp::Replace => wgpu::StencilOperation::Replace,
        StencilOp::IncrClamp => wgpu::StencilOperation::IncrementClamp,
        StencilOp::DecrClamp => wgpu::StencilOperation::DecrementClamp,
        StencilOp::Invert => wgpu::StencilOperation::Invert,
        StencilOp::IncrWrap => wgpu::StencilOperation::IncrementWrap,
        StencilOp::DecrWrap => wgpu::StencilOperation::DecrementWrap,
    }
}

fn stencil_face(s: &StencilState) -> wgpu::StencilFaceState {
    wgpu::StencilFaceState {
        compare: compare_function(s.cmp_func),
        fail_op: stencil_operation(s.fail_op),
        depth_fail_op: stencil_operation(s.depth_fail_op),
        pass_op: stencil_operation(s.pass_op),
    }
}

pub(crate) fn depth_stencil_state(
    dss: &DepthStencilState,
    rs: &RasterizerState,
) -> wgpu::DepthStencilState {
    let stencil = if dss.stencil_enabled {
        wgpu::StencilState {
            front: stencil_face(&dss.stencil_front),
            back: stencil_face(&dss.stencil_back),
            read_mask: u32::from(dss.stencil_read_mask),
            write_mask: u32::from(dss.stencil_write_mask),
        }
    } else {
        wgpu::StencilState::default()
    };

    let bias = if rs.depth_offset_enabled {
        wgpu::DepthBiasState {
            constant: 1,
            slope_scale: 1.0,
            clamp: 0.0,
        }
    } else {
        wgpu::DepthBiasState::default()
    };

    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: dss.depth_write_enabled,
        depth_compare: compare_function(dss.depth_cmp_func),
        stencil,
        bias,
    }
}

pub(crate) fn primitive_state(
    rs: &RasterizerState,
    primitive_type: PrimitiveType,
    index_type: IndexType,
) -> wgpu::PrimitiveState {
    let topology = match primitive_type {
        PrimitiveType::Points => wgpu::PrimitiveTopology::PointList,
        PrimitiveType::Lines => wgpu::PrimitiveTopology::LineList,
        PrimitiveType::LineStrip => wgpu::PrimitiveTopology::LineStrip,
        PrimitiveType::Triangles => wgpu::PrimitiveTopology::TriangleList,
        PrimitiveType::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
    };

    let strip_index_format = if topology.is_strip() {
        index_format(index_type)
    } else {
        None
    };

    let cull_mode = rs.cull_face_enabled.then_some(match rs.cull_face {
        Face::Front => wgpu::Face::Front,
        Face::Back => wgpu::Face::Back,
    });

    wgpu::PrimitiveState {
        topology,
        strip_index_format,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

/// The sample count always follows the render target; `multisample_enabled`
/// cannot change it.
pub(crate) fn multisample_state(rs: &RasterizerState, sample_count: u32) -> wgpu::MultisampleState {
    wgpu::MultisampleState {
        count: sample_count,
        mask: !0,
        alpha_to_coverage_enabled: rs.alpha_to_coverage_enabled && sample_count > 1,
    }
}

pub(crate) fn index_format(index_type: IndexType) -> Option<wgpu::IndexFormat> {
    match index_type {
        IndexType::None => None,
        IndexType::Index16 => Some(wgpu::IndexFormat::Uint16),
        IndexType::Index32 => Some(wgpu::IndexFormat::Uint32),
    }
}

fn vertex_format(f: VertexFormat) -> wgpu::VertexFormat {
    match f {
        VertexFormat::Float2 => wgpu::VertexFormat::Float32x2,
        VertexFormat::Float3 => wgpu::VertexFormat::Float32x3,
        VertexFormat::Float4 => wgpu::VertexFormat::Float32x4,
        VertexFormat::Byte4N => wgpu::VertexFormat::Snorm8x4,
        VertexFormat::UByte4N => wgpu::VertexFormat::Unorm8x4,
    }
}

pub(crate) fn vertex_attributes(layout: &VertexLayout) -> Vec<wgpu::VertexAttribute> {
    layout
        .offsets()
        .map(|(attr, format, offset)| wgpu::VertexAttribute {
            format: vertex_format(format),
            offset: u64::from(offset),
            shader_location: attr.shader_location(),
        })
        .collect()
}
