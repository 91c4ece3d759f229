//! Camera buffer layout definitions
//!
//! Defines the uniforms consumed by the culling kernel and the point material.

use bytemuck::{Pod, Zeroable};
use cgmath::{Matrix4, Vector3};

/// Scalar uniforms of the culling kernel
/// Total size: 32 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct CullUniforms {
    /// Camera world position
    pub camera_position: [f32; 3],

    /// Number of points in the Point Store
    pub point_count: u32,

    /// Points farther than this are culled
    pub max_distance: f32,

    /// Points whose apparent size falls below this are culled
    pub min_size: f32,

    /// Camera near plane, reference distance for the size heuristic
    pub near_plane: f32,

    /// Camera far plane
    pub far_plane: f32,
}

/// Camera uniforms of the point material
/// Total size: 96 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct RenderUniforms {
    /// Combined view-projection matrix
    pub view_proj: [[f32; 4]; 4],

    /// World-space camera right vector for billboarding
    pub camera_right: [f32; 3],
    pub _padding0: f32,

    /// World-space camera up vector for billboarding
    pub camera_up: [f32; 3],
    pub _padding1: f32,
}

impl RenderUniforms {
    /// Build from view and projection matrices
    ///
    /// The camera basis is read from the rows of the view rotation.
    pub fn new(view: Matrix4<f32>, projection: Matrix4<f32>) -> Self {
        let right = Vector3::new(view.x.x, view.y.x, view.z.x);
        let up = Vector3::new(view.x.y, view.y.y, view.z.y);

        Self {
            view_proj: (projection * view).into(),
            camera_right: right.into(),
            _padding0: 0.0,
            camera_up: up.into(),
            _padding1: 0.0,
        }
    }
}

impl Default for RenderUniforms {
    fn default() -> Self {
        use cgmath::SquareMatrix;
        Self::new(Matrix4::identity(), Matrix4::identity())
    }
}
