//! Diagnostic readback
//!
//! Blocking copies of device buffers into host memory. Each read allocates
//! its own scratch buffer and releases it afterwards. None of this runs on
//! the steady-state frame path unless `debug_mode` is set.

use crate::renderer::error::{RendererErrorContext, RendererResult};

/// Copy `size` bytes of `source` to the host, blocking until the device is idle
pub fn read_buffer_blocking(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    source: &wgpu::Buffer,
    size: u64,
) -> RendererResult<Vec<u8>> {
    if size == 0 {
        return Ok(Vec::new());
    }

    let scratch = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Diagnostic Readback Scratch"),
        size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Diagnostic Readback Copy"),
    });
    encoder.copy_buffer_to_buffer(source, 0, &scratch, 0, size);
    queue.submit(Some(encoder.finish()));

    let (sender, receiver) = flume::bounded(1);
    scratch
        .slice(..)
        .map_async(wgpu::MapMode::Read, move |result| {
            sender.send(result).ok();
        });

    let _ = device.poll(wgpu::Maintain::Wait);

    let result = receiver
        .recv()
        .readback_context("read_buffer_blocking")
        .and_then(|mapped| mapped.readback_context("read_buffer_blocking"))
        .map(|()| {
            let bytes = scratch.slice(..).get_mapped_range().to_vec();
            scratch.unmap();
            bytes
        });

    scratch.destroy();
    result
}

/// Log line emitted by the debug readback
pub fn visible_points_line(visible: u32, total: u32) -> String {
    format!("Visible points: {} of {}", visible, total)
}

/// Opt-in per-frame visible count readback
#[derive(Debug, Clone, Default)]
pub struct DiagnosticReadback {
    enabled: bool,
    last_count: Option<u32>,
    failures: u32,
}

impl DiagnosticReadback {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Default::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record the outcome of one readback
    ///
    /// Failures are logged and swallowed so the render loop keeps going.
    pub fn record(&mut self, result: RendererResult<u32>, total: u32) -> Option<u32> {
        match result {
            Ok(visible) => {
                log::info!("{}", visible_points_line(visible, total));
                self.last_count = Some(visible);
                Some(visible)
            }
            Err(e) => {
                self.failures += 1;
                log::warn!("[DiagnosticReadback::record] Visible count readback failed: {}", e);
                None
            }
        }
    }

    /// Last successfully read visible count
    pub fn last_count(&self) -> Option<u32> {
        self.last_count
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }
}
