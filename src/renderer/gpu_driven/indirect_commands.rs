use crate::gpu::buffer_layouts::{CommandBufferLayout, GeometryMeta, IndirectDrawIndexedCommand};
use crate::gpu::create_buffer_checked;
use crate::renderer::error::RendererResult;
use super::diagnostics::read_buffer_blocking;

/// Single-record indirect draw-argument buffer
///
/// The geometry fields are re-asserted every frame from the mesh metadata;
/// `instance_count` is only ever advanced by the culling kernel after the
/// frame reset.
pub struct IndirectArgsBuffer {
    buffer: wgpu::Buffer,
    meta: GeometryMeta,
}

impl IndirectArgsBuffer {
    pub fn new(device: &wgpu::Device, meta: GeometryMeta) -> RendererResult<Self> {
        let buffer = create_buffer_checked(
            device,
            &wgpu::BufferDescriptor {
                label: Some("Indirect Draw Args"),
                size: CommandBufferLayout::args_buffer_size(),
                usage: wgpu::BufferUsages::INDIRECT
                    | wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_DST
                    | wgpu::BufferUsages::COPY_SRC,
                mapped_at_creation: false,
            },
        )?;

        log::debug!(
            "[IndirectArgsBuffer::new] Geometry: {} indices from {}, base vertex {}",
            meta.index_count,
            meta.start_index,
            meta.base_vertex
        );

        Ok(Self { buffer, meta })
    }

    /// Rewrite the constant fields and zero `instance_count`
    ///
    /// Must be called before the frame's command buffer is submitted; queue
    /// writes are ordered ahead of it.
    pub fn reset_frame(&self, queue: &wgpu::Queue) {
        let command = IndirectDrawIndexedCommand::frame_start(&self.meta);
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&command));
    }

    /// Blocking read of the current record, for diagnostics and verification
    pub fn read_blocking(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> RendererResult<IndirectDrawIndexedCommand> {
        let bytes = read_buffer_blocking(
            device,
            queue,
            &self.buffer,
            CommandBufferLayout::args_buffer_size(),
        )?;
        Ok(bytemuck::pod_read_unaligned(&bytes))
    }

    pub fn meta(&self) -> &GeometryMeta {
        &self.meta
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Release the device buffer
    pub fn destroy(&self) {
        self.buffer.destroy();
    }
}
