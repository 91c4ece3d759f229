//! GPU buffer layouts and device context
//!
//! Centralized, type-safe buffer layouts with WGSL-compatible alignment, plus
//! the device/queue context shared by every point cloud component.

pub mod buffer_layouts;
pub mod context;

pub use buffer_layouts::{
    CullUniforms, GeometryMeta, IndirectDrawIndexedCommand, PointRecord, QuadVertex,
    RenderUniforms,
};
pub use context::{DeviceFaultMonitor, GpuContext};

/// Check a buffer size against the device limits before allocating it
pub fn check_buffer_size(
    device: &wgpu::Device,
    label: &str,
    size: u64,
    storage_binding: bool,
) -> crate::error::EngineResult<()> {
    let limits = device.limits();

    if size > limits.max_buffer_size {
        return Err(crate::error::EngineError::AllocationFailed {
            buffer: label.to_string(),
            size,
            reason: format!("exceeds max_buffer_size {}", limits.max_buffer_size),
        });
    }

    if storage_binding && size > limits.max_storage_buffer_binding_size as u64 {
        return Err(crate::error::EngineError::AllocationFailed {
            buffer: label.to_string(),
            size,
            reason: format!(
                "exceeds max_storage_buffer_binding_size {}",
                limits.max_storage_buffer_binding_size
            ),
        });
    }

    Ok(())
}

/// Create a buffer inside an out-of-memory error scope
///
/// Blocks on the scope result, so only call this during initialization.
pub fn create_buffer_checked(
    device: &wgpu::Device,
    descriptor: &wgpu::BufferDescriptor,
) -> crate::error::EngineResult<wgpu::Buffer> {
    let label = descriptor.label.unwrap_or("unnamed buffer");
    check_buffer_size(
        device,
        label,
        descriptor.size,
        descriptor.usage.contains(wgpu::BufferUsages::STORAGE),
    )?;

    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    let buffer = device.create_buffer(descriptor);
    if let Some(error) = pollster::block_on(device.pop_error_scope()) {
        log::error!(
            "[gpu::create_buffer_checked] Allocation of '{}' ({} bytes) failed: {}",
            label,
            descriptor.size,
            error
        );
        return Err(crate::error::EngineError::AllocationFailed {
            buffer: label.to_string(),
            size: descriptor.size,
            reason: error.to_string(),
        });
    }

    Ok(buffer)
}
