//! Windowed demo loop
//!
//! Opens a window, uploads a generated point cloud and renders it with an
//! orbiting camera until the window closes.

use crate::camera::{init_camera, transform, update_aspect_ratio, CameraData};
use crate::config::PointCloudConfig;
use crate::constants::camera_constants::{DEFAULT_ORBIT_HEIGHT, DEFAULT_ORBIT_RADIUS};
use crate::bounds::aabb_center;
use crate::error::EngineError;
use crate::generator::SpherePointGenerator;
use crate::gpu::GpuContext;
use crate::renderer::{
    create_depth_texture, FrameContext, PointCloudAssets, PointCloudRenderer,
};
use anyhow::{anyhow, Result};
use std::sync::Arc;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowBuilder};

/// Demo window and camera options
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Orbit speed in radians per second
    pub orbit_speed: f32,
    pub point_cloud: PointCloudConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_title: "Point Cloud Engine".to_string(),
            window_width: 1280,
            window_height: 720,
            orbit_speed: 0.2,
            point_cloud: PointCloudConfig::default(),
        }
    }
}

/// Everything the window needs per frame
struct DemoState {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    depth: (wgpu::Texture, wgpu::TextureView),
    renderer: PointCloudRenderer,
    camera: CameraData,
    orbit_target: [f32; 3],
    orbit_angle: f32,
    orbit_speed: f32,
    orbit_paused: bool,
    size: PhysicalSize<u32>,
}

impl DemoState {
    async fn new(window: Arc<Window>, config: &AppConfig) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| anyhow!("Surface creation failed: {}", e))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(EngineError::DeviceNotFound)?;

        let ctx = GpuContext::from_adapter(&adapter).await?;

        let surface_config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or_else(|| anyhow!("Surface is not supported by the adapter"))?;
        surface.configure(&ctx.device, &surface_config);

        let depth = create_depth_texture(&ctx.device, surface_config.width, surface_config.height);

        let point_config = config.point_cloud.clone();
        let mut generator = SpherePointGenerator::from_config(&point_config);
        let renderer = PointCloudRenderer::initialize(
            ctx,
            point_config,
            &PointCloudAssets::builtin(),
            &mut generator,
            surface_config.format,
        )?;

        let orbit_target = aabb_center(renderer.point_bounds());
        let camera = transform::orbit(
            &init_camera(size.width, size.height),
            orbit_target,
            DEFAULT_ORBIT_RADIUS,
            DEFAULT_ORBIT_HEIGHT,
            0.0,
        );

        Ok(Self {
            window,
            surface,
            surface_config,
            depth,
            renderer,
            camera,
            orbit_target,
            orbit_angle: 0.0,
            orbit_speed: config.orbit_speed,
            orbit_paused: false,
            size,
        })
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        let device = &self.renderer.context().device;
        let max_dimension = device.limits().max_texture_dimension_2d;
        let width = new_size.width.min(max_dimension);
        let height = new_size.height.min(max_dimension);

        self.size = PhysicalSize::new(width, height);
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(device, &self.surface_config);
        self.depth = create_depth_texture(device, width, height);
        self.camera = update_aspect_ratio(&self.camera, width, height);

        log::debug!("[DemoState::resize] Resized to {}x{}", width, height);
    }

    fn render(&mut self, delta_time: f32) -> Result<()> {
        if !self.orbit_paused {
            self.orbit_angle =
                (self.orbit_angle + self.orbit_speed * delta_time) % std::f32::consts::TAU;
        }
        self.camera = transform::orbit(
            &self.camera,
            self.orbit_target,
            DEFAULT_ORBIT_RADIUS,
            DEFAULT_ORBIT_HEIGHT,
            self.orbit_angle,
        );

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.resize(self.size);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("[DemoState::render] Surface timeout, frame skipped");
                return Ok(());
            }
            Err(e) => {
                self.renderer
                    .context()
                    .faults
                    .report(format!("surface error: {:?}", e));
                return Err(anyhow!("Surface error: {:?}", e));
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let report = self.renderer.tick(&FrameContext {
            camera: Some(&self.camera),
            color_view: &view,
            depth_view: &self.depth.1,
            clear_color: wgpu::Color {
                r: 0.02,
                g: 0.02,
                b: 0.04,
                a: 1.0,
            },
        })?;
        output.present();

        if report.frame_index % 300 == 0 {
            log::info!(
                "[render loop] Frame {}: {} workgroups, camera at ({:.1}, {:.1}, {:.1})",
                report.frame_index,
                report.workgroups,
                self.camera.position[0],
                self.camera.position[1],
                self.camera.position[2]
            );
        }

        Ok(())
    }
}

/// Point cloud demo application
pub struct PointCloudApp {
    config: AppConfig,
}

impl PointCloudApp {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Run until the window closes or a fatal error occurs
    pub fn run(self) -> Result<()> {
        self.config.point_cloud.validate()?;

        let event_loop = EventLoop::new()?;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(&self.config.window_title)
                .with_inner_size(LogicalSize::new(
                    self.config.window_width,
                    self.config.window_height,
                ))
                .build(&event_loop)?,
        );

        let mut state = pollster::block_on(DemoState::new(window, &self.config))?;
        log::info!(
            "[PointCloudApp::run] Rendering {} points",
            state.renderer.point_count()
        );

        let mut last_frame = std::time::Instant::now();
        state.window.request_redraw();

        event_loop.run(move |event, elwt| match event {
            Event::WindowEvent { ref event, window_id } if window_id == state.window.id() => {
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Resized(physical_size) => state.resize(*physical_size),
                    WindowEvent::KeyboardInput { event, .. }
                        if event.state == ElementState::Pressed =>
                    {
                        match event.physical_key {
                            PhysicalKey::Code(KeyCode::Escape) => elwt.exit(),
                            PhysicalKey::Code(KeyCode::Space) => {
                                state.orbit_paused = !state.orbit_paused;
                            }
                            _ => {}
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        let now = std::time::Instant::now();
                        let delta_time = (now - last_frame).as_secs_f32();
                        last_frame = now;

                        if let Err(e) = state.render(delta_time) {
                            log::error!("[render loop] Stopping: {}", e);
                            elwt.exit();
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => state.window.request_redraw(),
            Event::LoopExiting => state.renderer.shutdown(),
            _ => {}
        })?;

        Ok(())
    }
}
