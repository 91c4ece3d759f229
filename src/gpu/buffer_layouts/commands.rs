//! Indirect command buffer layout definitions
//!
//! Defines the draw-argument record consumed by the indirect draw and the
//! geometry metadata it is derived from.

use crate::constants::buffer_layouts::*;
use bytemuck::{Pod, Zeroable};

/// GPU indirect draw indexed command structure
/// Matches wgpu's DrawIndexedIndirect command layout exactly
/// Total size: 20 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct IndirectDrawIndexedCommand {
    /// Number of indices to draw per instance
    pub index_count: u32,

    /// Number of instances to draw, written by the culling kernel
    pub instance_count: u32,

    /// Offset into the index buffer
    pub first_index: u32,

    /// Value added to each index before fetching vertex
    pub base_vertex: i32,

    /// Offset into the instance range
    pub first_instance: u32,
}

impl IndirectDrawIndexedCommand {
    /// Command for the start of a frame: geometry constants, zero instances
    pub fn frame_start(meta: &GeometryMeta) -> Self {
        Self {
            index_count: meta.index_count,
            instance_count: 0,
            first_index: meta.start_index,
            base_vertex: meta.base_vertex,
            first_instance: 0,
        }
    }
}

/// Per-draw geometry metadata supplied by the mesh asset
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GeometryMeta {
    /// Index count of the submesh
    pub index_count: u32,

    /// First index of the submesh
    pub start_index: u32,

    /// Base vertex of the submesh
    pub base_vertex: i32,
}

/// Command buffer layout information
pub struct CommandBufferLayout;

impl CommandBufferLayout {
    /// Size of the single-record indirect argument buffer
    #[inline]
    pub fn args_buffer_size() -> u64 {
        INDIRECT_INDEXED_COMMAND_SIZE
    }

    /// Calculate buffer size for the visible index list
    #[inline]
    pub fn visible_buffer_size(capacity: u32) -> u64 {
        capacity as u64 * VISIBLE_INDEX_SIZE
    }

    /// Calculate buffer size for the point records
    #[inline]
    pub fn point_buffer_size(capacity: u32) -> u64 {
        capacity as u64 * POINT_RECORD_SIZE
    }
}
