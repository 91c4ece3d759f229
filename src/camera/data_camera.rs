/// Data-Oriented Camera System
///
/// Pure data structures with free functions. The point cloud renderer reads
/// the camera once per frame to build the culling and material uniforms.
use crate::constants::camera_constants::*;
use crate::gpu::buffer_layouts::{CullUniforms, RenderUniforms};
use bytemuck::{Pod, Zeroable};
use cgmath::{perspective, InnerSpace, Matrix4, Point3, Rad, Vector3};

/// Camera data as a plain old data structure
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct CameraData {
    pub position: [f32; 3],
    pub yaw_radians: f32,
    pub pitch_radians: f32,
    pub aspect_ratio: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
    _padding: [f32; 3],
}

/// Culling thresholds the camera is combined with each frame
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CullThresholds {
    pub max_distance: f32,
    pub min_size: f32,
}

// Pure functions for camera operations

/// Initialize camera data looking down -Z from the default orbit height
pub fn init_camera(width: u32, height: u32) -> CameraData {
    CameraData {
        position: [0.0, DEFAULT_ORBIT_HEIGHT, DEFAULT_ORBIT_RADIUS],
        yaw_radians: -std::f32::consts::FRAC_PI_2, // -90 degrees
        pitch_radians: 0.0,
        aspect_ratio: aspect(width, height),
        fovy_radians: std::f32::consts::FRAC_PI_3, // 60 degrees
        znear: ZNEAR,
        zfar: ZFAR,
        _padding: [0.0; 3],
    }
}

/// Camera at `position` oriented towards `target`
pub fn init_camera_looking_at(
    width: u32,
    height: u32,
    position: [f32; 3],
    target: [f32; 3],
) -> CameraData {
    let mut camera = init_camera(width, height);
    camera.position = position;
    let (yaw, pitch) = yaw_pitch_towards(position, target);
    camera.yaw_radians = yaw;
    camera.pitch_radians = pitch;
    camera
}

fn aspect(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

/// Update camera aspect ratio for window resize
pub fn update_aspect_ratio(camera: &CameraData, width: u32, height: u32) -> CameraData {
    let mut updated = *camera;
    updated.aspect_ratio = aspect(width, height);
    updated
}

/// Calculate forward vector from camera orientation
pub fn calculate_forward_vector(yaw_rad: f32, pitch_rad: f32) -> Vector3<f32> {
    let (sin_yaw, cos_yaw) = yaw_rad.sin_cos();
    let (sin_pitch, cos_pitch) = pitch_rad.sin_cos();

    Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw)
}

/// Yaw and pitch of the direction from `from` to `to`
pub fn yaw_pitch_towards(from: [f32; 3], to: [f32; 3]) -> (f32, f32) {
    let dir = Vector3::new(to[0] - from[0], to[1] - from[1], to[2] - from[2]);
    if dir.magnitude2() == 0.0 {
        return (-std::f32::consts::FRAC_PI_2, 0.0);
    }
    let dir = dir.normalize();
    (dir.z.atan2(dir.x), dir.y.clamp(-1.0, 1.0).asin())
}

/// Build view matrix from camera data
pub fn build_view_matrix(camera: &CameraData) -> Matrix4<f32> {
    let position = Point3::new(camera.position[0], camera.position[1], camera.position[2]);
    let forward = calculate_forward_vector(camera.yaw_radians, camera.pitch_radians);

    Matrix4::look_at_rh(position, position + forward, Vector3::unit_y())
}

/// Build projection matrix from camera data
pub fn build_projection_matrix(camera: &CameraData) -> Matrix4<f32> {
    perspective(
        Rad(camera.fovy_radians),
        camera.aspect_ratio,
        camera.znear,
        camera.zfar,
    )
}

/// Build the point material uniforms
pub fn build_render_uniforms(camera: &CameraData) -> RenderUniforms {
    RenderUniforms::new(build_view_matrix(camera), build_projection_matrix(camera))
}

/// Build the culling kernel uniforms
pub fn build_cull_uniforms(
    camera: &CameraData,
    thresholds: &CullThresholds,
    point_count: u32,
) -> CullUniforms {
    CullUniforms {
        camera_position: camera.position,
        point_count,
        max_distance: thresholds.max_distance,
        min_size: thresholds.min_size,
        near_plane: camera.znear,
        far_plane: camera.zfar,
    }
}

/// Camera movement transformations (returns new camera data)
pub mod transform {
    use super::*;

    /// Place the camera on a horizontal circle around `target`, facing it
    pub fn orbit(
        camera: &CameraData,
        target: [f32; 3],
        radius: f32,
        height: f32,
        angle_radians: f32,
    ) -> CameraData {
        let (sin_a, cos_a) = angle_radians.sin_cos();
        let position = [
            target[0] + radius * cos_a,
            target[1] + height,
            target[2] + radius * sin_a,
        ];
        let (yaw, pitch) = yaw_pitch_towards(position, target);

        let mut updated = *camera;
        updated.position = position;
        updated.yaw_radians = yaw;
        updated.pitch_radians = pitch;
        updated
    }

    /// Move camera forward by amount
    pub fn move_forward(camera: &CameraData, amount: f32) -> CameraData {
        let forward = calculate_forward_vector(camera.yaw_radians, camera.pitch_radians);
        let mut updated = *camera;
        updated.position[0] += forward.x * amount;
        updated.position[1] += forward.y * amount;
        updated.position[2] += forward.z * amount;
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_looking_at_origin() {
        let camera = init_camera_looking_at(800, 600, [10.0, 0.0, 0.0], [0.0, 0.0, 0.0]);
        let forward = calculate_forward_vector(camera.yaw_radians, camera.pitch_radians);

        assert!((forward.x + 1.0).abs() < EPS);
        assert!(forward.y.abs() < EPS);
        assert!(forward.z.abs() < EPS);
        assert!((camera.aspect_ratio - 800.0 / 600.0).abs() < EPS);
    }

    #[test]
    fn test_orbit_keeps_radius_and_faces_target() {
        let camera = init_camera(1280, 720);
        for step in 0..8 {
            let angle = step as f32 * std::f32::consts::FRAC_PI_4;
            let orbited = transform::orbit(&camera, [0.0; 3], 50.0, 10.0, angle);

            let horizontal = (orbited.position[0].powi(2) + orbited.position[2].powi(2)).sqrt();
            assert!((horizontal - 50.0).abs() < EPS);
            assert!((orbited.position[1] - 10.0).abs() < EPS);

            // Moving forward by the full distance lands on the target
            let distance = (50.0f32 * 50.0 + 10.0 * 10.0).sqrt();
            let arrived = transform::move_forward(&orbited, distance);
            for axis in 0..3 {
                assert!(arrived.position[axis].abs() < 1e-2, "{:?}", arrived.position);
            }
        }
    }

    #[test]
    fn test_cull_uniforms_carry_camera_and_thresholds() {
        let camera = init_camera_looking_at(100, 100, [1.0, 2.0, 3.0], [0.0; 3]);
        let uniforms = build_cull_uniforms(
            &camera,
            &CullThresholds {
                max_distance: 75.0,
                min_size: 0.5,
            },
            42,
        );

        assert_eq!(uniforms.camera_position, [1.0, 2.0, 3.0]);
        assert_eq!(uniforms.point_count, 42);
        assert_eq!(uniforms.max_distance, 75.0);
        assert_eq!(uniforms.min_size, 0.5);
        assert_eq!(uniforms.near_plane, ZNEAR);
        assert_eq!(uniforms.far_plane, ZFAR);
    }

    #[test]
    fn test_zero_sized_window_does_not_produce_nan() {
        let camera = update_aspect_ratio(&init_camera(0, 0), 0, 0);
        assert!(camera.aspect_ratio.is_finite());
    }
}
