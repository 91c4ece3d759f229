/// Point cloud demo executable
/// Renders a generated point cloud with GPU culling and one indirect draw per frame.
/// Usage: point_cloud_demo [config.toml]

use point_cloud_engine::{AppConfig, PointCloudApp, PointCloudConfig};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let point_cloud = match std::env::args().nth(1) {
        Some(path) => PointCloudConfig::load(&path)?,
        None => {
            log::info!("No config file given, using defaults");
            PointCloudConfig::default()
        }
    };

    let config = AppConfig {
        point_cloud,
        ..Default::default()
    };

    PointCloudApp::new(config).run()
}
