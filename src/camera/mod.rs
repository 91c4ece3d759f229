//! Camera data and pure camera functions

pub mod data_camera;

pub use data_camera::{
    build_cull_uniforms, build_projection_matrix, build_render_uniforms, build_view_matrix,
    calculate_forward_vector, init_camera, init_camera_looking_at, transform,
    update_aspect_ratio, CameraData, CullThresholds,
};
