//! Point Store
//!
//! Immutable device-resident array of point records. Populated once through
//! a mapped-at-creation upload; there is no mutation API afterwards.

use crate::bounds::{aabb_from_points, Aabb};
use crate::error::EngineError;
use crate::generator::{generate_points, PointGenerator};
use crate::gpu::buffer_layouts::{CommandBufferLayout, PointRecord};
use crate::gpu::create_buffer_checked;
use crate::renderer::error::RendererResult;

pub struct PointStore {
    buffer: wgpu::Buffer,
    capacity: u32,
    bounds: Aabb,
}

impl PointStore {
    /// Generate `capacity` records and upload them
    pub fn initialize<G>(
        device: &wgpu::Device,
        capacity: u32,
        generator: &mut G,
    ) -> RendererResult<Self>
    where
        G: PointGenerator + ?Sized,
    {
        if capacity == 0 {
            return Err(EngineError::invalid_config(
                "point_count",
                "point store capacity must be greater than 0",
            ));
        }

        let records = generate_points(generator, capacity);
        Self::from_records(device, &records)
    }

    /// Upload an existing record array
    pub fn from_records(device: &wgpu::Device, records: &[PointRecord]) -> RendererResult<Self> {
        let bounds = aabb_from_points(records.iter().map(|p| p.position)).ok_or_else(|| {
            EngineError::invalid_config(
                "point_count",
                "point store capacity must be greater than 0",
            )
        })?;

        if let Some(bad) = records
            .iter()
            .position(|p| p.position.iter().any(|c| !c.is_finite()) || !p.size.is_finite())
        {
            return Err(EngineError::invalid_config(
                "points",
                format!("record {} has a non-finite position or size", bad),
            ));
        }

        let capacity = records.len() as u32;
        let size = CommandBufferLayout::point_buffer_size(capacity);
        let buffer = create_buffer_checked(
            device,
            &wgpu::BufferDescriptor {
                label: Some("Point Store"),
                size,
                usage: wgpu::BufferUsages::STORAGE,
                mapped_at_creation: true,
            },
        )?;

        buffer
            .slice(..)
            .get_mapped_range_mut()
            .copy_from_slice(bytemuck::cast_slice(records));
        buffer.unmap();

        log::info!(
            "[PointStore::from_records] Uploaded {} points ({} bytes), bounds {:?}",
            capacity,
            size,
            bounds
        );

        Ok(Self {
            buffer,
            capacity,
            bounds,
        })
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Exact bounds of the uploaded positions
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Release the device buffer
    pub fn destroy(&self) {
        self.buffer.destroy();
    }
}
