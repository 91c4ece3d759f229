#[cfg(test)]
mod tests {
    use super::super::{IndirectArgsBuffer, PointStore, VisibilityBuffer};
    use crate::error::EngineError;
    use crate::gpu::buffer_layouts::{GeometryMeta, IndirectDrawIndexedCommand, PointRecord};
    use crate::gpu::GpuContext;

    /// Initialize GPU context for tests
    fn init_gpu() -> Option<GpuContext> {
        pollster::block_on(GpuContext::headless()).ok()
    }

    fn quad_meta() -> GeometryMeta {
        GeometryMeta {
            index_count: 6,
            start_index: 0,
            base_vertex: 0,
        }
    }

    #[test]
    fn test_point_store_records_bounds() {
        let Some(ctx) = init_gpu() else {
            println!("Skipping GPU test - no GPU available");
            return;
        };

        let records = vec![
            PointRecord::new([-1.0, 2.0, 3.0], 1.0, [1.0; 4]),
            PointRecord::new([4.0, -5.0, 0.5], 1.0, [1.0; 4]),
        ];
        let store = PointStore::from_records(&ctx.device, &records).expect("upload");

        assert_eq!(store.capacity(), 2);
        assert_eq!(store.bounds().min, [-1.0, -5.0, 0.5]);
        assert_eq!(store.bounds().max, [4.0, 2.0, 3.0]);
        assert_eq!(store.buffer().size(), 64);
    }

    #[test]
    fn test_point_store_rejects_zero_capacity() {
        let Some(ctx) = init_gpu() else {
            println!("Skipping GPU test - no GPU available");
            return;
        };

        let mut generator = |_: u32| PointRecord::default();
        match PointStore::initialize(&ctx.device, 0, &mut generator) {
            Err(EngineError::InvalidConfiguration { field, .. }) => {
                assert_eq!(field, "point_count")
            }
            Err(other) => panic!("unexpected {:?}", other),
            Ok(_) => panic!("empty store accepted"),
        }
    }

    #[test]
    fn test_visibility_reset_then_count_is_zero() {
        let Some(ctx) = init_gpu() else {
            println!("Skipping GPU test - no GPU available");
            return;
        };

        let visibility = VisibilityBuffer::new(&ctx.device, 128).expect("allocate");

        // Dirty the counter first
        ctx.queue
            .write_buffer(visibility.counter_buffer(), 0, bytemuck::bytes_of(&77u32));
        assert_eq!(
            visibility
                .read_count_blocking(&ctx.device, &ctx.queue)
                .expect("read"),
            77
        );

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        visibility.reset(&mut encoder);
        ctx.queue.submit(Some(encoder.finish()));

        let pending = visibility.current_count(&ctx.device, &ctx.queue);
        ctx.wait_idle();
        assert_eq!(pollster::block_on(pending).expect("read"), 0);
    }

    #[test]
    fn test_args_reset_frame() {
        let Some(ctx) = init_gpu() else {
            println!("Skipping GPU test - no GPU available");
            return;
        };

        let args = IndirectArgsBuffer::new(&ctx.device, quad_meta()).expect("allocate");
        ctx.queue.write_buffer(
            args.buffer(),
            0,
            bytemuck::bytes_of(&IndirectDrawIndexedCommand {
                index_count: 1,
                instance_count: 999,
                first_index: 2,
                base_vertex: -3,
                first_instance: 4,
            }),
        );

        args.reset_frame(&ctx.queue);
        let command = args.read_blocking(&ctx.device, &ctx.queue).expect("read");
        assert_eq!(command, IndirectDrawIndexedCommand::frame_start(&quad_meta()));
        assert_eq!(command.instance_count, 0);
        assert_eq!(command.index_count, 6);
    }
}
