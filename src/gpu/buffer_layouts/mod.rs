//! Centralized GPU buffer layout definitions
//!
//! Single source of truth for the buffer layouts, sizes and binding indices
//! shared by the culling kernel and the point material.

pub mod camera;
pub mod commands;
pub mod point;


pub use camera::{CullUniforms, RenderUniforms};
pub use commands::{CommandBufferLayout, GeometryMeta, IndirectDrawIndexedCommand};
pub use point::{PointRecord, QuadVertex};

/// Buffer binding indices for consistency across shaders
pub mod bindings {
    /// Culling kernel bindings
    pub mod cull {
        pub const UNIFORMS: u32 = 0;
        pub const ALL_POINTS: u32 = 1;
        pub const VISIBLE_POINTS: u32 = 2;
        pub const VISIBLE_COUNT: u32 = 3;
        pub const ARGS_BUFFER: u32 = 4;
    }

    /// Point material bindings
    pub mod render {
        pub const CAMERA_UNIFORM: u32 = 0;
        pub const ALL_POINTS: u32 = 1;
        pub const VISIBLE_POINTS: u32 = 2;
    }
}
