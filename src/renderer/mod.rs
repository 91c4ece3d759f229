//! Point cloud renderer
//!
//! Assets, error helpers and the GPU-driven culling and draw pipeline.

pub mod assets;
pub mod error;
pub mod gpu_driven;

pub use assets::{KernelSource, MaterialSource, PointCloudAssets, PointMesh};
pub use error::{RendererErrorContext, RendererResult};
pub use gpu_driven::{
    create_depth_texture, FrameContext, FrameReport, LifecycleState, PointCloudRenderer,
};
