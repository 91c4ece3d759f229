// Point Cloud Engine Constants - SINGLE SOURCE OF TRUTH
//
// Constants shared by host code and the built-in WGSL shaders. The shaders
// hard-code the same values; tests assert they stay in sync.

/// Culling kernel constants
pub mod culling {
    /// Threads per workgroup declared by the culling kernel
    pub const WORKGROUP_SIZE: u32 = 64;

    /// Distance at which the size heuristic reports a point's full size
    pub const SIZE_REFERENCE_DISTANCE: f32 = 1.0;

    /// Kernel entry point name
    pub const CULL_ENTRY_POINT: &str = "cull_points";
}

/// Material (render shader) constants
pub mod material {
    pub const VERTEX_ENTRY_POINT: &str = "vs_main";
    pub const FRAGMENT_ENTRY_POINT: &str = "fs_main";

    /// Depth format used by the point pipeline
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
}

/// Camera constants (world units)
pub mod camera_constants {
    /// Near clipping plane
    pub const ZNEAR: f32 = 0.3;

    /// Far clipping plane
    pub const ZFAR: f32 = 1000.0;

    /// Default orbit distance of the demo camera
    pub const DEFAULT_ORBIT_RADIUS: f32 = 120.0;

    /// Default orbit height of the demo camera
    pub const DEFAULT_ORBIT_HEIGHT: f32 = 30.0;
}

/// Default configuration values
pub mod defaults {
    pub const POINT_COUNT: u32 = 100_000;
    pub const MAX_DISTANCE: f32 = 100.0;
    pub const MIN_SIZE: f32 = 0.01;
    pub const SPAWN_RADIUS: f32 = 50.0;
    pub const POINT_SIZE_RANGE: (f32, f32) = (0.1, 2.0);
    /// Half extent of the default render bounds cube (1000 units wide)
    pub const RENDER_BOUNDS_HALF_EXTENT: f32 = 500.0;
    pub const DEBUG_MODE: bool = false;
    pub const SEED: u64 = 0x5EED;
}

/// GPU buffer layout sizes (bytes)
pub mod buffer_layouts {
    /// vec3 position + f32 size + vec4 color
    pub const POINT_RECORD_SIZE: u64 = 32;

    /// One u32 index per visible point
    pub const VISIBLE_INDEX_SIZE: u64 = 4;

    /// Atomic visible counter
    pub const VISIBLE_COUNTER_SIZE: u64 = 4;

    /// 5 u32 values, matches DrawIndexedIndirect
    pub const INDIRECT_INDEXED_COMMAND_SIZE: u64 = 20;

    /// vec3 camera position + u32 count + 4 f32 thresholds
    pub const CULL_UNIFORMS_SIZE: u64 = 32;

    /// mat4 + 2 padded vec3
    pub const RENDER_UNIFORMS_SIZE: u64 = 96;

    /// vec2 quad corner
    pub const QUAD_VERTEX_SIZE: u64 = 8;
}
