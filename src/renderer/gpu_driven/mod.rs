/// GPU-driven point cloud rendering
///
/// The device decides what to draw: a compute kernel culls the point set
/// into an append buffer and writes the instance count of an indirect draw,
/// which is then issued once per frame.
///
/// Key components:
/// - Point Store: immutable device-resident point records
/// - Visibility Buffer: visible indices plus atomic counter
/// - Indirect draw arguments, reset every frame
/// - Culling kernel dispatch
/// - Single indirect draw per frame
/// - Optional blocking diagnostic readback

pub mod culling_pipeline;
pub mod diagnostics;
pub mod frame_state;
pub mod gpu_driven_renderer;
pub mod indirect_commands;
pub mod point_cloud_renderer;
pub mod point_store;
pub mod reference;
pub mod visibility_buffer;

#[cfg(test)]
mod tests;

pub use culling_pipeline::{workgroup_count, CullingPipeline};
pub use diagnostics::{read_buffer_blocking, visible_points_line, DiagnosticReadback};
pub use frame_state::{FramePhase, FrameSequencer, LifecycleState};
pub use gpu_driven_renderer::{create_depth_texture, DrawStats, GpuDrivenRenderer};
pub use indirect_commands::IndirectArgsBuffer;
pub use point_cloud_renderer::{FrameContext, FrameReport, PointCloudRenderer};
pub use point_store::PointStore;
pub use reference::{
    cull_reference, is_point_visible, size_heuristic, HostCullOutput, HostCullingPass,
};
pub use visibility_buffer::VisibilityBuffer;
