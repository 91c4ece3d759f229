//! Point cloud renderer component
//!
//! Owns every device buffer of the point pipeline and drives one frame per
//! `tick`: reset the draw arguments and the visible counter, dispatch the
//! culling kernel, then issue the single indirect draw. All of it goes out
//! in one submission so queue order gives `Reset -> Cull -> Draw` without
//! any host synchronization.

use crate::bounds::{aabb_contains_aabb, Aabb};
use crate::camera::{build_cull_uniforms, build_render_uniforms, CameraData, CullThresholds};
use crate::config::PointCloudConfig;
use crate::constants::culling::WORKGROUP_SIZE;
use crate::error::EngineError;
use crate::generator::PointGenerator;
use crate::gpu::GpuContext;
use crate::renderer::assets::PointCloudAssets;
use crate::renderer::error::{pipeline_fault, RendererResult};
use super::culling_pipeline::{workgroup_count, CullingPipeline};
use super::diagnostics::DiagnosticReadback;
use super::frame_state::{FramePhase, FrameSequencer, LifecycleState};
use super::gpu_driven_renderer::{DrawStats, GpuDrivenRenderer};
use super::indirect_commands::IndirectArgsBuffer;
use super::point_store::PointStore;
use super::visibility_buffer::VisibilityBuffer;
use futures::future::{self, Either};
use std::future::Future;

/// Per-frame inputs
pub struct FrameContext<'a> {
    /// Active camera; without one the cull is skipped and nothing is drawn
    pub camera: Option<&'a CameraData>,
    pub color_view: &'a wgpu::TextureView,
    pub depth_view: &'a wgpu::TextureView,
    pub clear_color: wgpu::Color,
}

/// What one tick recorded
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Frames completed including this one
    pub frame_index: u64,

    /// Workgroups dispatched by the culling pass, 0 when skipped
    pub workgroups: u32,

    /// Draw statistics
    pub draw: DrawStats,

    /// Visible count, only read back in debug mode
    pub visible_count: Option<u32>,
}

pub struct PointCloudRenderer {
    ctx: GpuContext,
    config: PointCloudConfig,
    store: PointStore,
    visibility: VisibilityBuffer,
    args: IndirectArgsBuffer,
    culling: CullingPipeline,
    renderer: GpuDrivenRenderer,
    diagnostics: DiagnosticReadback,
    sequencer: FrameSequencer,
    state: LifecycleState,
}

impl PointCloudRenderer {
    /// Validate inputs, upload the points and build both pipelines
    ///
    /// Fails with `InvalidConfiguration` before touching the device if an
    /// option or asset reference is invalid.
    pub fn initialize<G>(
        ctx: GpuContext,
        config: PointCloudConfig,
        assets: &PointCloudAssets,
        generator: &mut G,
        color_format: wgpu::TextureFormat,
    ) -> RendererResult<Self>
    where
        G: PointGenerator + ?Sized,
    {
        config.validate()?;
        let assets = assets.resolve()?;

        let max_groups = ctx.device.limits().max_compute_workgroups_per_dimension;
        if workgroup_count(config.point_count).unwrap_or(0) > max_groups {
            return Err(EngineError::invalid_config(
                "point_count",
                format!(
                    "{} points need more than {} workgroups of {}",
                    config.point_count, max_groups, WORKGROUP_SIZE
                ),
            ));
        }

        let device = &ctx.device;
        let store = PointStore::initialize(device, config.point_count, generator)?;

        if !aabb_contains_aabb(&config.render_bounds, store.bounds()) {
            store.destroy();
            return Err(EngineError::invalid_config(
                "render_bounds",
                format!(
                    "{:?} does not contain the point bounds {:?}",
                    config.render_bounds,
                    store.bounds()
                ),
            ));
        }

        let visibility = VisibilityBuffer::new(device, config.point_count)?;
        let args = IndirectArgsBuffer::new(device, assets.mesh.meta)?;
        args.reset_frame(&ctx.queue);

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let culling = CullingPipeline::new(device, assets.kernel, &store, &visibility, &args);
        let renderer = GpuDrivenRenderer::new(
            device,
            color_format,
            assets.material,
            assets.mesh,
            &store,
            &visibility,
        );
        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            log::error!("[PointCloudRenderer::initialize] Pipeline creation failed: {}", error);
            return Err(pipeline_fault("pipeline creation", error));
        }

        log::info!(
            "[PointCloudRenderer::initialize] Ready: {} points, debug readback {}",
            config.point_count,
            if config.debug_mode { "on" } else { "off" }
        );

        Ok(Self {
            diagnostics: DiagnosticReadback::new(config.debug_mode),
            ctx,
            config,
            store,
            visibility,
            args,
            culling,
            renderer,
            sequencer: FrameSequencer::default(),
            state: LifecycleState::Ready,
        })
    }

    /// Record and submit one frame
    pub fn tick(&mut self, frame: &FrameContext<'_>) -> RendererResult<FrameReport> {
        self.ensure_ready()?;

        let result = self.record_frame(frame);
        if result.is_err() {
            self.sequencer.abort();
        }
        let mut report = result?;

        // Uncaptured device errors surface during encode/submit
        self.ensure_ready()?;

        if self.diagnostics.is_enabled() {
            let read = self
                .visibility
                .read_count_blocking(&self.ctx.device, &self.ctx.queue);
            report.visible_count = self.diagnostics.record(read, self.store.capacity());
        }

        Ok(report)
    }

    fn record_frame(&mut self, frame: &FrameContext<'_>) -> RendererResult<FrameReport> {
        let queue = &self.ctx.queue;
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Point Cloud Frame"),
            });

        self.sequencer.advance_to(FramePhase::ResetCounters)?;
        self.args.reset_frame(queue);
        self.visibility.reset(&mut encoder);

        self.sequencer.advance_to(FramePhase::Cull)?;
        let workgroups = match frame.camera {
            Some(camera) => {
                let thresholds = CullThresholds {
                    max_distance: self.config.max_distance,
                    min_size: self.config.min_size,
                };
                let cull_uniforms =
                    build_cull_uniforms(camera, &thresholds, self.store.capacity());
                self.culling.update_uniforms(queue, &cull_uniforms);
                self.renderer
                    .update_uniforms(queue, &build_render_uniforms(camera));
                self.culling.dispatch(&mut encoder, self.store.capacity())
            }
            None => {
                log::debug!("[PointCloudRenderer::tick] No camera, culling skipped");
                0
            }
        };

        self.sequencer.advance_to(FramePhase::Draw)?;
        let draw = {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Point Cloud Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: frame.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(frame.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: frame.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer
                .draw_indirect(&mut render_pass, &self.args, &self.config.render_bounds)
        };

        queue.submit(Some(encoder.finish()));
        self.sequencer.advance_to(FramePhase::Idle)?;

        Ok(FrameReport {
            frame_index: self.sequencer.frames_completed(),
            workgroups,
            draw,
            visible_count: None,
        })
    }

    /// Fail unless the component accepts frames, entering `Faulted` on a device fault
    fn ensure_ready(&mut self) -> RendererResult<()> {
        match self.state {
            LifecycleState::Ready => {}
            LifecycleState::Faulted => {
                return Err(EngineError::PipelineFault {
                    message: self
                        .ctx
                        .faults
                        .fault()
                        .unwrap_or_else(|| "renderer is faulted".to_string()),
                })
            }
            LifecycleState::ShutDown => {
                return Err(EngineError::NotRunning {
                    state: self.state.to_string(),
                })
            }
        }

        if let Some(fault) = self.ctx.faults.fault() {
            log::error!("[PointCloudRenderer::tick] Device fault, halting frames: {}", fault);
            self.state = LifecycleState::Faulted;
            return Err(EngineError::PipelineFault { message: fault });
        }

        Ok(())
    }

    /// Asynchronous visible count of the last submitted frame
    ///
    /// Resolves once the device has been polled past the copy. Outside
    /// `Ready` nothing is recorded and the future resolves to `NotRunning`.
    pub fn current_visible_count(&self) -> impl Future<Output = RendererResult<u32>> + 'static {
        if self.state != LifecycleState::Ready {
            return Either::Left(future::ready(Err(EngineError::NotRunning {
                state: self.state.to_string(),
            })));
        }

        Either::Right(
            self.visibility
                .current_count(&self.ctx.device, &self.ctx.queue),
        )
    }

    /// Wait for outstanding device work and release every buffer
    ///
    /// Idempotent; also runs on drop.
    pub fn shutdown(&mut self) {
        if self.state == LifecycleState::ShutDown {
            return;
        }

        self.ctx.wait_idle();
        self.culling.destroy();
        self.renderer.destroy();
        self.args.destroy();
        self.visibility.destroy();
        self.store.destroy();

        self.state = LifecycleState::ShutDown;
        log::info!(
            "[PointCloudRenderer::shutdown] Released buffers after {} frames",
            self.sequencer.frames_completed()
        );
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn config(&self) -> &PointCloudConfig {
        &self.config
    }

    pub fn point_count(&self) -> u32 {
        self.store.capacity()
    }

    /// Exact bounds of the uploaded points
    pub fn point_bounds(&self) -> &Aabb {
        self.store.bounds()
    }

    pub fn context(&self) -> &GpuContext {
        &self.ctx
    }

    pub fn visibility(&self) -> &VisibilityBuffer {
        &self.visibility
    }

    pub fn draw_args(&self) -> &IndirectArgsBuffer {
        &self.args
    }

    pub fn diagnostics(&self) -> &DiagnosticReadback {
        &self.diagnostics
    }
}

impl Drop for PointCloudRenderer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
