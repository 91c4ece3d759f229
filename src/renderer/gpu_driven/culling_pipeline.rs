use crate::constants::culling::{CULL_ENTRY_POINT, WORKGROUP_SIZE};
use crate::gpu::buffer_layouts::{bindings, CullUniforms};
use crate::renderer::assets::KernelSource;
use super::indirect_commands::IndirectArgsBuffer;
use super::point_store::PointStore;
use super::visibility_buffer::VisibilityBuffer;

/// Workgroups needed to cover `point_count` threads, `None` when there is nothing to dispatch
pub fn workgroup_count(point_count: u32) -> Option<u32> {
    if point_count == 0 {
        None
    } else {
        Some(point_count.div_ceil(WORKGROUP_SIZE))
    }
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// GPU culling pipeline
///
/// Owns the kernel, its uniform buffer and the bind group over the point
/// buffers. The bind group is built once; the buffers it references live
/// for the lifetime of the renderer.
pub struct CullingPipeline {
    /// Compute pipeline for culling
    pipeline: wgpu::ComputePipeline,

    /// Culling uniform buffer
    uniform_buffer: wgpu::Buffer,

    /// Bind group over uniforms, points, visible list, counter and args
    bind_group: wgpu::BindGroup,
}

impl CullingPipeline {
    pub fn new(
        device: &wgpu::Device,
        kernel: &KernelSource,
        store: &PointStore,
        visibility: &VisibilityBuffer,
        args: &IndirectArgsBuffer,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(kernel.label.as_str()),
            source: wgpu::ShaderSource::Wgsl(kernel.wgsl.as_str().into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Point Culling Bind Group Layout"),
            entries: &[
                // Culling uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: bindings::cull::UNIFORMS,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                storage_entry(bindings::cull::ALL_POINTS, true),
                storage_entry(bindings::cull::VISIBLE_POINTS, false),
                storage_entry(bindings::cull::VISIBLE_COUNT, false),
                storage_entry(bindings::cull::ARGS_BUFFER, false),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Culling Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Point Culling Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: CULL_ENTRY_POINT,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Culling Uniform Buffer"),
            size: std::mem::size_of::<CullUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Point Culling Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: bindings::cull::UNIFORMS,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: bindings::cull::ALL_POINTS,
                    resource: store.buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: bindings::cull::VISIBLE_POINTS,
                    resource: visibility.indices_buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: bindings::cull::VISIBLE_COUNT,
                    resource: visibility.counter_buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: bindings::cull::ARGS_BUFFER,
                    resource: args.buffer().as_entire_binding(),
                },
            ],
        });

        log::info!(
            "[CullingPipeline::new] Created '{}' with workgroup size {}",
            kernel.label,
            WORKGROUP_SIZE
        );

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
        }
    }

    /// Upload this frame's culling uniforms
    ///
    /// Queue writes land before the command buffers of the next submit.
    pub fn update_uniforms(&self, queue: &wgpu::Queue, uniforms: &CullUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Record the culling dispatch, returns the workgroups issued
    pub fn dispatch(&self, encoder: &mut wgpu::CommandEncoder, point_count: u32) -> u32 {
        let Some(workgroups) = workgroup_count(point_count) else {
            log::trace!("[CullingPipeline::dispatch] Empty point set, dispatch skipped");
            return 0;
        };

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Point Culling Pass"),
            timestamp_writes: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.dispatch_workgroups(workgroups, 1, 1);

        workgroups
    }

    /// Release the uniform buffer
    pub fn destroy(&self) {
        self.uniform_buffer.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workgroup_count() {
        assert_eq!(workgroup_count(0), None);
        assert_eq!(workgroup_count(1), Some(1));
        assert_eq!(workgroup_count(64), Some(1));
        assert_eq!(workgroup_count(65), Some(2));
        assert_eq!(workgroup_count(100_000), Some(1563));
        assert_eq!(workgroup_count(u32::MAX), Some(u32::MAX / 64 + 1));
    }
}
