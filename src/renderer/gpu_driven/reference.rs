//! Host reference culling
//!
//! The brute-force visibility predicate used to verify the device kernel,
//! and a parallel host emulation of the append kernel with the same
//! semantics: unordered output, one append per visible point, and the
//! instance count incremented alongside the counter.

use crate::constants::culling::{SIZE_REFERENCE_DISTANCE, WORKGROUP_SIZE};
use crate::gpu::buffer_layouts::{CullUniforms, IndirectDrawIndexedCommand, PointRecord};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};

/// Apparent (angular) size of a point seen from `distance`
///
/// Equals `size` within one reference distance of the camera, never exceeds
/// `size` and is non-increasing in `distance`. Evaluated in the same order
/// as the kernel.
#[inline]
pub fn size_heuristic(size: f32, distance: f32) -> f32 {
    size / distance.max(SIZE_REFERENCE_DISTANCE)
}

#[inline]
pub fn point_distance(a: [f32; 3], b: [f32; 3]) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// The visibility predicate applied to one point
#[inline]
pub fn is_point_visible(point: &PointRecord, uniforms: &CullUniforms) -> bool {
    let d = point_distance(point.position, uniforms.camera_position);
    d <= uniforms.max_distance
        && size_heuristic(point.size, d) >= uniforms.min_size
}

/// Brute-force visible set, ascending indices
pub fn cull_reference(points: &[PointRecord], uniforms: &CullUniforms) -> Vec<u32> {
    let count = (uniforms.point_count as usize).min(points.len());
    points[..count]
        .iter()
        .enumerate()
        .filter(|(_, point)| is_point_visible(point, uniforms))
        .map(|(i, _)| i as u32)
        .collect()
}

/// Result of one emulated culling dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct HostCullOutput {
    /// Visible indices in append order
    pub visible: Vec<u32>,

    /// Final value of the append counter
    pub visible_count: u32,

    /// Draw arguments after the pass
    pub args: IndirectDrawIndexedCommand,

    /// Workgroups the dispatch covered
    pub workgroups: u32,
}

/// Parallel host emulation of the culling kernel
pub struct HostCullingPass;

impl HostCullingPass {
    /// Run the kernel over `points` starting from already-reset arguments
    pub fn dispatch(
        points: &[PointRecord],
        uniforms: &CullUniforms,
        args: IndirectDrawIndexedCommand,
    ) -> HostCullOutput {
        let count = uniforms.point_count.min(points.len() as u32);
        let workgroups = count.div_ceil(WORKGROUP_SIZE);

        let visible_count = AtomicU32::new(0);
        let instance_count = AtomicU32::new(args.instance_count);
        let slots: Vec<AtomicU32> = (0..count).map(|_| AtomicU32::new(u32::MAX)).collect();

        // Same grid shape as the device: whole workgroups, tail threads exit
        (0..workgroups).into_par_iter().for_each(|group| {
            for local in 0..WORKGROUP_SIZE {
                let index = group * WORKGROUP_SIZE + local;
                if index >= count {
                    return;
                }

                if is_point_visible(&points[index as usize], uniforms) {
                    let slot = visible_count.fetch_add(1, Ordering::Relaxed);
                    slots[slot as usize].store(index, Ordering::Relaxed);
                    instance_count.fetch_add(1, Ordering::Relaxed);
                }
            }
        });

        let visible_count = visible_count.into_inner();
        let visible = slots
            .into_iter()
            .take(visible_count as usize)
            .map(AtomicU32::into_inner)
            .collect();

        HostCullOutput {
            visible,
            visible_count,
            args: IndirectDrawIndexedCommand {
                instance_count: instance_count.into_inner(),
                ..args
            },
            workgroups,
        }
    }
}
