//! GPU Culling Validation Tests
//!
//! Runs the culling kernel and indirect draw on a real device and checks the
//! visible set, counter and draw arguments against the host reference.
//! Every test skips when no adapter is available.

use point_cloud_engine::camera::{build_cull_uniforms, init_camera_looking_at, CullThresholds};
use point_cloud_engine::generator::{generate_points, SpherePointGenerator};
use point_cloud_engine::renderer::create_depth_texture;
use point_cloud_engine::renderer::gpu_driven::reference::{
    cull_reference, point_distance, size_heuristic,
};
use point_cloud_engine::{
    CameraData, EngineError, FrameContext, GpuContext, LifecycleState, PointCloudAssets,
    PointCloudConfig, PointCloudRenderer, PointRecord,
};

const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const TARGET_SIZE: u32 = 64;

/// Initialize GPU context for tests
fn init_gpu() -> Option<GpuContext> {
    pollster::block_on(GpuContext::headless()).ok()
}

struct OffscreenTarget {
    _color: wgpu::Texture,
    color_view: wgpu::TextureView,
    _depth: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

fn offscreen_target(device: &wgpu::Device) -> OffscreenTarget {
    let color = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Test Color Target"),
        size: wgpu::Extent3d {
            width: TARGET_SIZE,
            height: TARGET_SIZE,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: COLOR_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
    let (depth, depth_view) = create_depth_texture(device, TARGET_SIZE, TARGET_SIZE);

    OffscreenTarget {
        _color: color,
        color_view,
        _depth: depth,
        depth_view,
    }
}

fn camera_at_origin() -> CameraData {
    init_camera_looking_at(TARGET_SIZE, TARGET_SIZE, [0.0; 3], [1.0, 0.0, 0.0])
}

fn tick(
    renderer: &mut PointCloudRenderer,
    target: &OffscreenTarget,
    camera: Option<&CameraData>,
) -> point_cloud_engine::EngineResult<point_cloud_engine::FrameReport> {
    renderer.tick(&FrameContext {
        camera,
        color_view: &target.color_view,
        depth_view: &target.depth_view,
        clear_color: wgpu::Color::BLACK,
    })
}

/// Visible indices of the last frame, sorted
fn read_visible(renderer: &PointCloudRenderer) -> Vec<u32> {
    let ctx = renderer.context();
    let count = renderer
        .visibility()
        .read_count_blocking(&ctx.device, &ctx.queue)
        .expect("count readback");
    let mut visible = renderer
        .visibility()
        .read_indices_blocking(&ctx.device, &ctx.queue, count)
        .expect("index readback");
    visible.sort_unstable();
    visible
}

fn initialize(
    ctx: GpuContext,
    config: PointCloudConfig,
    records: &[PointRecord],
) -> point_cloud_engine::EngineResult<PointCloudRenderer> {
    let mut generator = |i: u32| records[i as usize];
    PointCloudRenderer::initialize(
        ctx,
        config,
        &PointCloudAssets::builtin(),
        &mut generator,
        COLOR_FORMAT,
    )
}

fn four_point_line() -> Vec<PointRecord> {
    [1.0, 5.0, 50.0, 200.0]
        .iter()
        .map(|&x| PointRecord::new([x, 0.0, 0.0], 10.0, [1.0, 0.5, 0.25, 1.0]))
        .collect()
}

#[test]
fn test_distance_threshold_scenario() {
    let Some(ctx) = init_gpu() else {
        println!("Skipping GPU test - no GPU available");
        return;
    };

    let records = four_point_line();
    let config = PointCloudConfig {
        point_count: 4,
        max_distance: 100.0,
        min_size: 0.01,
        ..Default::default()
    };
    let mut renderer = initialize(ctx, config, &records).expect("initialize");
    let target = offscreen_target(&renderer.context().device);
    let camera = camera_at_origin();

    let report = tick(&mut renderer, &target, Some(&camera)).expect("tick");
    assert_eq!(report.workgroups, 1);
    assert_eq!(report.draw.draw_calls, 1);

    assert_eq!(read_visible(&renderer), vec![0, 1, 2]);

    let ctx = renderer.context();
    let args = renderer
        .draw_args()
        .read_blocking(&ctx.device, &ctx.queue)
        .expect("args readback");
    assert_eq!(args.instance_count, 3);
    assert_eq!(args.index_count, 6);
    assert_eq!(args.first_index, 0);
    assert_eq!(args.base_vertex, 0);
    assert_eq!(args.first_instance, 0);
}

#[test]
fn test_counts_do_not_accumulate_across_frames() {
    let Some(ctx) = init_gpu() else {
        println!("Skipping GPU test - no GPU available");
        return;
    };

    let records = four_point_line();
    let config = PointCloudConfig {
        point_count: 4,
        debug_mode: true,
        ..Default::default()
    };
    let mut renderer = initialize(ctx, config, &records).expect("initialize");
    let target = offscreen_target(&renderer.context().device);
    let camera = camera_at_origin();

    for frame in 1..=3u64 {
        let report = tick(&mut renderer, &target, Some(&camera)).expect("tick");
        assert_eq!(report.frame_index, frame);
        assert_eq!(report.visible_count, Some(3));

        let ctx = renderer.context();
        let args = renderer
            .draw_args()
            .read_blocking(&ctx.device, &ctx.queue)
            .expect("args readback");
        assert_eq!(args.instance_count, 3);
    }
    assert_eq!(renderer.diagnostics().last_count(), Some(3));
}

#[test]
fn test_min_size_above_every_point_draws_nothing() {
    let Some(ctx) = init_gpu() else {
        println!("Skipping GPU test - no GPU available");
        return;
    };

    let config = PointCloudConfig {
        point_count: 1_000,
        min_size: 5.0,
        point_size_range: (0.1, 2.0),
        ..Default::default()
    };
    let mut generator = SpherePointGenerator::from_config(&config);
    let mut renderer = PointCloudRenderer::initialize(
        ctx,
        config,
        &PointCloudAssets::builtin(),
        &mut generator,
        COLOR_FORMAT,
    )
    .expect("initialize");
    let target = offscreen_target(&renderer.context().device);
    let camera = camera_at_origin();

    tick(&mut renderer, &target, Some(&camera)).expect("tick");

    let ctx = renderer.context();
    let args = renderer
        .draw_args()
        .read_blocking(&ctx.device, &ctx.queue)
        .expect("args readback");
    assert_eq!(args.instance_count, 0);
    assert!(read_visible(&renderer).is_empty());
}

#[test]
fn test_visible_set_matches_host_reference() {
    let Some(ctx) = init_gpu() else {
        println!("Skipping GPU test - no GPU available");
        return;
    };

    let camera = init_camera_looking_at(TARGET_SIZE, TARGET_SIZE, [0.0, 0.0, 30.0], [0.0; 3]);
    let thresholds = CullThresholds {
        max_distance: 45.0,
        min_size: 0.02,
    };

    // Keep points clear of both thresholds so device and host rounding agree
    let mut generator = SpherePointGenerator::new(42, [0.0; 3], 50.0, (0.1, 2.0));
    let records: Vec<PointRecord> = generate_points(&mut generator, 20_000)
        .into_iter()
        .filter(|p| {
            let d = point_distance(p.position, camera.position);
            let apparent = size_heuristic(p.size, d);
            (d - thresholds.max_distance).abs() > 1e-2
                && (apparent - thresholds.min_size).abs() > 1e-4
        })
        .collect();
    let point_count = records.len() as u32;

    let config = PointCloudConfig {
        point_count,
        max_distance: thresholds.max_distance,
        min_size: thresholds.min_size,
        ..Default::default()
    };
    let mut renderer = initialize(ctx, config, &records).expect("initialize");
    let target = offscreen_target(&renderer.context().device);

    tick(&mut renderer, &target, Some(&camera)).expect("tick");

    let expected = cull_reference(
        &records,
        &build_cull_uniforms(&camera, &thresholds, point_count),
    );
    assert!(!expected.is_empty());
    assert!(expected.len() < records.len());

    let visible = read_visible(&renderer);
    assert_eq!(visible, expected);

    let mut deduped = visible.clone();
    deduped.dedup();
    assert_eq!(deduped.len(), visible.len());

    let ctx = renderer.context();
    let args = renderer
        .draw_args()
        .read_blocking(&ctx.device, &ctx.queue)
        .expect("args readback");
    assert_eq!(args.instance_count as usize, visible.len());
    assert!(args.instance_count <= point_count);

    // Same inputs, same visible set
    tick(&mut renderer, &target, Some(&camera)).expect("tick");
    assert_eq!(read_visible(&renderer), expected);
}

#[test]
fn test_missing_camera_draws_zero_instances() {
    let Some(ctx) = init_gpu() else {
        println!("Skipping GPU test - no GPU available");
        return;
    };

    let records = four_point_line();
    let config = PointCloudConfig {
        point_count: 4,
        ..Default::default()
    };
    let mut renderer = initialize(ctx, config, &records).expect("initialize");
    let target = offscreen_target(&renderer.context().device);
    let camera = camera_at_origin();

    tick(&mut renderer, &target, Some(&camera)).expect("tick");
    let report = tick(&mut renderer, &target, None).expect("tick without camera");
    assert_eq!(report.workgroups, 0);
    assert_eq!(report.draw.draw_calls, 1);

    let ctx = renderer.context();
    let args = renderer
        .draw_args()
        .read_blocking(&ctx.device, &ctx.queue)
        .expect("args readback");
    assert_eq!(args.instance_count, 0);

    let pending = renderer.current_visible_count();
    ctx.wait_idle();
    assert_eq!(pollster::block_on(pending).expect("count"), 0);
}

#[test]
fn test_initialization_rejects_bad_inputs() {
    let Some(ctx) = init_gpu() else {
        println!("Skipping GPU test - no GPU available");
        return;
    };

    let records = four_point_line();

    // Unset asset references
    let mut generator = |i: u32| records[i as usize];
    let result = PointCloudRenderer::initialize(
        ctx.clone(),
        PointCloudConfig {
            point_count: 4,
            ..Default::default()
        },
        &PointCloudAssets::default(),
        &mut generator,
        COLOR_FORMAT,
    );
    assert!(matches!(
        result,
        Err(EngineError::InvalidConfiguration { .. })
    ));

    // Render bounds smaller than the point set
    let tight = PointCloudConfig {
        point_count: 4,
        render_bounds: point_cloud_engine::bounds::aabb_from_center_half_extents(
            [0.0; 3],
            [100.0; 3],
        ),
        ..Default::default()
    };
    match initialize(ctx.clone(), tight, &records) {
        Err(EngineError::InvalidConfiguration { field, .. }) => assert_eq!(field, "render_bounds"),
        Err(other) => panic!("unexpected {:?}", other),
        Ok(_) => panic!("bounds violation accepted"),
    }

    // Zero capacity
    let empty = PointCloudConfig {
        point_count: 0,
        ..Default::default()
    };
    assert!(matches!(
        initialize(ctx, empty, &records),
        Err(EngineError::InvalidConfiguration { .. })
    ));
}

#[test]
fn test_shutdown_is_idempotent_and_stops_frames() {
    let Some(ctx) = init_gpu() else {
        println!("Skipping GPU test - no GPU available");
        return;
    };

    let records = four_point_line();
    let config = PointCloudConfig {
        point_count: 4,
        ..Default::default()
    };
    let mut renderer = initialize(ctx, config, &records).expect("initialize");
    let target = offscreen_target(&renderer.context().device);
    let camera = camera_at_origin();

    tick(&mut renderer, &target, Some(&camera)).expect("tick");
    assert_eq!(renderer.state(), LifecycleState::Ready);

    renderer.shutdown();
    renderer.shutdown();
    assert_eq!(renderer.state(), LifecycleState::ShutDown);

    assert!(matches!(
        tick(&mut renderer, &target, Some(&camera)),
        Err(EngineError::NotRunning { .. })
    ));

    // Released buffers are never read back
    assert!(matches!(
        pollster::block_on(renderer.current_visible_count()),
        Err(EngineError::NotRunning { .. })
    ));
    renderer.context().wait_idle();
    assert_eq!(renderer.context().faults.fault(), None);
}

#[test]
fn test_device_fault_halts_frames() {
    let Some(ctx) = init_gpu() else {
        println!("Skipping GPU test - no GPU available");
        return;
    };

    let faults = ctx.faults.clone();
    let records = four_point_line();
    let config = PointCloudConfig {
        point_count: 4,
        ..Default::default()
    };
    let mut renderer = initialize(ctx, config, &records).expect("initialize");
    let target = offscreen_target(&renderer.context().device);
    let camera = camera_at_origin();

    tick(&mut renderer, &target, Some(&camera)).expect("tick");

    faults.report("device lost");
    assert!(matches!(
        tick(&mut renderer, &target, Some(&camera)),
        Err(EngineError::PipelineFault { .. })
    ));
    assert_eq!(renderer.state(), LifecycleState::Faulted);

    // Every later frame fails too
    assert!(tick(&mut renderer, &target, Some(&camera)).is_err());
    assert!(matches!(
        pollster::block_on(renderer.current_visible_count()),
        Err(EngineError::NotRunning { .. })
    ));
}
