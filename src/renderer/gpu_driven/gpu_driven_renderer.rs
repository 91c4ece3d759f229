use wgpu::util::DeviceExt;
use crate::bounds::Aabb;
use crate::constants::material::{DEPTH_FORMAT, FRAGMENT_ENTRY_POINT, VERTEX_ENTRY_POINT};
use crate::gpu::buffer_layouts::{bindings, QuadVertex, RenderUniforms};
use crate::renderer::assets::{MaterialSource, PointMesh};
use super::{
    indirect_commands::IndirectArgsBuffer, point_store::PointStore,
    visibility_buffer::VisibilityBuffer,
};

/// Statistics of one draw
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DrawStats {
    /// Indirect draw calls issued
    pub draw_calls: u32,

    /// Bound passed with the draw
    pub bounds: Option<Aabb>,
}

fn vertex_storage_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// GPU-driven point renderer
///
/// Draws one billboard quad per visible point with a single indirect
/// indexed draw whose instance count was written by the culling kernel.
pub struct GpuDrivenRenderer {
    /// Render pipeline
    render_pipeline: wgpu::RenderPipeline,

    /// Camera uniforms of the material
    uniform_buffer: wgpu::Buffer,

    /// Bind group over uniforms, points and visible list
    bind_group: wgpu::BindGroup,

    /// Quad mesh buffers
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
}

impl GpuDrivenRenderer {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        material: &MaterialSource,
        mesh: &PointMesh,
        store: &PointStore,
        visibility: &VisibilityBuffer,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(material.label.as_str()),
            source: wgpu::ShaderSource::Wgsl(material.wgsl.as_str().into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Point Material Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: bindings::render::CAMERA_UNIFORM,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                vertex_storage_entry(bindings::render::ALL_POINTS),
                vertex_storage_entry(bindings::render::VISIBLE_POINTS),
            ],
        });

        let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Material Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Point Material Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: VERTEX_ENTRY_POINT,
                buffers: &[QuadVertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: FRAGMENT_ENTRY_POINT,
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Billboards always face the camera
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Point Material Uniforms"),
            contents: bytemuck::bytes_of(&RenderUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Point Quad Vertices"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Point Quad Indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Point Material Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: bindings::render::CAMERA_UNIFORM,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: bindings::render::ALL_POINTS,
                    resource: store.buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: bindings::render::VISIBLE_POINTS,
                    resource: visibility.indices_buffer().as_entire_binding(),
                },
            ],
        });

        log::info!(
            "[GpuDrivenRenderer::new] Created '{}' for {:?}",
            material.label,
            color_format
        );

        Self {
            render_pipeline,
            uniform_buffer,
            bind_group,
            vertex_buffer,
            index_buffer,
        }
    }

    /// Upload this frame's material uniforms
    pub fn update_uniforms(&self, queue: &wgpu::Queue, uniforms: &RenderUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Issue exactly one indirect indexed draw
    ///
    /// `bounds` is the conservative world-space bound of every point the
    /// draw may produce. Records GPU work only; never blocks.
    pub fn draw_indirect<'a>(
        &'a self,
        render_pass: &mut wgpu::RenderPass<'a>,
        args: &'a IndirectArgsBuffer,
        bounds: &Aabb,
    ) -> DrawStats {
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed_indirect(args.buffer(), 0);

        DrawStats {
            draw_calls: 1,
            bounds: Some(*bounds),
        }
    }

    /// Release the material buffers
    pub fn destroy(&self) {
        self.uniform_buffer.destroy();
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}

/// Depth attachment matching the point pipeline
pub fn create_depth_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Point Depth Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
