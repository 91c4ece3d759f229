//! Visibility Buffer
//!
//! Append buffer of visible point indices plus its atomic counter. The
//! counter lives in its own 4-byte buffer so it can be cleared and copied
//! without touching the index list.

use crate::constants::buffer_layouts::VISIBLE_COUNTER_SIZE;
use crate::gpu::buffer_layouts::CommandBufferLayout;
use crate::gpu::create_buffer_checked;
use crate::renderer::error::{RendererErrorContext, RendererResult};
use super::diagnostics::read_buffer_blocking;
use std::future::Future;

pub struct VisibilityBuffer {
    indices: wgpu::Buffer,
    counter: wgpu::Buffer,
    capacity: u32,
}

impl VisibilityBuffer {
    /// Allocate room for `capacity` indices
    pub fn new(device: &wgpu::Device, capacity: u32) -> RendererResult<Self> {
        let indices = create_buffer_checked(
            device,
            &wgpu::BufferDescriptor {
                label: Some("Visible Point Indices"),
                size: CommandBufferLayout::visible_buffer_size(capacity),
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
                mapped_at_creation: false,
            },
        )?;

        let counter = create_buffer_checked(
            device,
            &wgpu::BufferDescriptor {
                label: Some("Visible Point Counter"),
                size: VISIBLE_COUNTER_SIZE,
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_SRC
                    | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            },
        )?;

        Ok(Self {
            indices,
            counter,
            capacity,
        })
    }

    /// Record a counter clear into the frame's encoder
    pub fn reset(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.clear_buffer(&self.counter, 0, None);
    }

    /// Copy the counter into a fresh mappable scratch buffer and submit
    fn submit_counter_copy(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> wgpu::Buffer {
        let scratch = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Visible Count Readback"),
            size: VISIBLE_COUNTER_SIZE,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Visible Count Copy"),
        });
        encoder.copy_buffer_to_buffer(&self.counter, 0, &scratch, 0, VISIBLE_COUNTER_SIZE);
        queue.submit(Some(encoder.finish()));

        scratch
    }

    /// Current counter value
    ///
    /// The copy is submitted immediately; the returned future resolves once
    /// the device has finished it and the map callback has fired, which
    /// requires the device to be polled by the caller's loop.
    pub fn current_count(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> impl Future<Output = RendererResult<u32>> + 'static {
        let scratch = self.submit_counter_copy(device, queue);
        let (sender, receiver) = futures::channel::oneshot::channel();

        scratch
            .slice(..)
            .map_async(wgpu::MapMode::Read, move |result| {
                sender.send(result).ok();
            });

        async move {
            receiver
                .await
                .readback_context("VisibilityBuffer::current_count")?
                .readback_context("VisibilityBuffer::current_count")?;

            let count = read_counter(&scratch);
            scratch.destroy();
            Ok(count)
        }
    }

    /// Blocking counter read for diagnostics
    ///
    /// Waits for all outstanding device work; never call on the frame path.
    pub fn read_count_blocking(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> RendererResult<u32> {
        let bytes = read_buffer_blocking(device, queue, &self.counter, VISIBLE_COUNTER_SIZE)?;
        Ok(bytemuck::pod_read_unaligned::<u32>(&bytes))
    }

    /// Blocking read of the first `count` visible indices, for verification
    pub fn read_indices_blocking(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        count: u32,
    ) -> RendererResult<Vec<u32>> {
        let count = count.min(self.capacity);
        let bytes = read_buffer_blocking(
            device,
            queue,
            &self.indices,
            CommandBufferLayout::visible_buffer_size(count),
        )?;
        Ok(bytes
            .chunks_exact(std::mem::size_of::<u32>())
            .map(bytemuck::pod_read_unaligned::<u32>)
            .collect())
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn indices_buffer(&self) -> &wgpu::Buffer {
        &self.indices
    }

    pub fn counter_buffer(&self) -> &wgpu::Buffer {
        &self.counter
    }

    /// Release both device buffers
    pub fn destroy(&self) {
        self.indices.destroy();
        self.counter.destroy();
    }
}

/// Read the mapped counter value and unmap
fn read_counter(scratch: &wgpu::Buffer) -> u32 {
    let count = {
        let data = scratch.slice(..).get_mapped_range();
        *bytemuck::from_bytes::<u32>(&data)
    };
    scratch.unmap();
    count
}
