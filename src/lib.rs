pub mod app;
pub mod bounds;
pub mod camera;
pub mod config;
pub mod constants;
pub mod error;
pub mod generator;
pub mod gpu;
pub mod renderer;

pub use app::{AppConfig, PointCloudApp};
pub use bounds::Aabb;
pub use camera::CameraData;
pub use config::PointCloudConfig;
pub use error::{EngineError, EngineResult};
pub use generator::{PointGenerator, SpherePointGenerator};
pub use gpu::{GpuContext, PointRecord};
pub use renderer::{
    FrameContext, FrameReport, LifecycleState, PointCloudAssets, PointCloudRenderer,
};
