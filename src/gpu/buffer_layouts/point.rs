//! Point buffer layout definitions
//!
//! Defines the device-resident point record and the quad mesh vertex used to
//! draw one billboard per visible point.

use bytemuck::{Pod, Zeroable};
use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

/// Per-point attributes stored in the Point Store
/// Total size: 32 bytes
///
/// Memory layout (matches the WGSL `PointRecord` struct):
/// - Offset 0-11: position (vec3)
/// - Offset 12-15: size
/// - Offset 16-31: color RGBA (vec4)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PointRecord {
    /// World-space position
    pub position: [f32; 3],

    /// Declared point size in world units
    pub size: f32,

    /// Color with alpha
    pub color: [f32; 4],
}

impl PointRecord {
    pub fn new(position: [f32; 3], size: f32, color: [f32; 4]) -> Self {
        Self {
            position,
            size,
            color,
        }
    }
}

/// Corner of the unit quad billboard
/// Total size: 8 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    /// Corner offset in [-1, 1], scaled by half the point size
    pub corner: [f32; 2],
}

impl QuadVertex {
    const ATTRIBUTES: [VertexAttribute; 1] = [VertexAttribute {
        offset: 0,
        shader_location: 0,
        format: VertexFormat::Float32x2,
    }];

    /// Vertex buffer layout for the quad mesh
    pub fn desc<'a>() -> VertexBufferLayout<'a> {
        VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}
