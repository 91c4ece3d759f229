//! GPU device acquisition and fault monitoring
//!
//! Wraps the device/queue pair shared by every point cloud buffer. Errors the
//! device raises outside of an error scope (device lost, validation faults
//! in submitted work) are captured into a fault slot that the frame loop
//! checks without blocking.

use crate::error::{EngineError, EngineResult, OptionExt};
use parking_lot::Mutex;
use std::sync::Arc;

/// First uncaptured device error, if any
#[derive(Clone, Default)]
pub struct DeviceFaultMonitor {
    fault: Arc<Mutex<Option<String>>>,
}

impl DeviceFaultMonitor {
    /// Install the monitor as the device's uncaptured error handler
    pub fn install(device: &wgpu::Device) -> Self {
        let monitor = Self::default();
        let slot = monitor.fault.clone();

        device.on_uncaptured_error(Box::new(move |error: wgpu::Error| {
            log::error!("[DeviceFaultMonitor] Uncaptured GPU error: {}", error);
            let mut fault = slot.lock();
            if fault.is_none() {
                *fault = Some(error.to_string());
            }
        }));

        monitor
    }

    /// Record a fault observed elsewhere (e.g. surface loss)
    pub fn report(&self, message: impl Into<String>) {
        let mut fault = self.fault.lock();
        if fault.is_none() {
            *fault = Some(message.into());
        }
    }

    /// The first fault, left in place
    pub fn fault(&self) -> Option<String> {
        self.fault.lock().clone()
    }
}

/// Shared device, queue and fault monitor
#[derive(Clone)]
pub struct GpuContext {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    pub faults: DeviceFaultMonitor,
}

impl GpuContext {
    /// Wrap an existing device/queue pair and install fault monitoring
    pub fn from_parts(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        let faults = DeviceFaultMonitor::install(&device);
        Self {
            device,
            queue,
            faults,
        }
    }

    /// Create a context without a surface (tests, tools)
    pub async fn headless() -> EngineResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_engine(|| EngineError::DeviceNotFound)?;

        Self::from_adapter(&adapter).await
    }

    /// Request a device from an adapter with the limits the point pipeline needs
    pub async fn from_adapter(adapter: &wgpu::Adapter) -> EngineResult<Self> {
        let info = adapter.get_info();
        log::info!(
            "[GpuContext::from_adapter] Using adapter: {} ({:?})",
            info.name,
            info.backend
        );

        // Culling runs in compute, the material reads points from storage
        // in the vertex stage and the draw is indirect
        let required_flags = wgpu::DownlevelFlags::COMPUTE_SHADERS
            | wgpu::DownlevelFlags::VERTEX_STORAGE
            | wgpu::DownlevelFlags::INDIRECT_EXECUTION;
        let downlevel = adapter.get_downlevel_capabilities();
        if !downlevel.flags.contains(required_flags) {
            return Err(EngineError::DeviceRequest(format!(
                "adapter '{}' lacks {:?}",
                info.name,
                required_flags - downlevel.flags
            )));
        }

        // Large point sets need the adapter's full storage buffer range
        let hardware_limits = adapter.limits();
        let required_limits = wgpu::Limits {
            max_storage_buffer_binding_size: hardware_limits.max_storage_buffer_binding_size,
            max_buffer_size: hardware_limits.max_buffer_size,
            ..wgpu::Limits::default()
        }
        .using_resolution(hardware_limits);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Point Cloud Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits,
                },
                None,
            )
            .await
            .map_err(|e| EngineError::DeviceRequest(e.to_string()))?;

        Ok(Self::from_parts(Arc::new(device), Arc::new(queue)))
    }

    /// Block until all submitted work has completed
    pub fn wait_idle(&self) {
        let _ = self.device.poll(wgpu::Maintain::Wait);
    }
}
