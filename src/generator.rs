//! Point generators
//!
//! The generator is the sole writer of the Point Store: it is asked for
//! exactly `capacity` records once, at initialization.

use crate::config::PointCloudConfig;
use crate::gpu::buffer_layouts::PointRecord;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of point records for the one-shot Point Store upload
pub trait PointGenerator {
    /// Produce the record stored at `index`
    fn generate(&mut self, index: u32) -> PointRecord;
}

impl<F> PointGenerator for F
where
    F: FnMut(u32) -> PointRecord,
{
    fn generate(&mut self, index: u32) -> PointRecord {
        self(index)
    }
}

/// Uniformly distributed points inside a sphere, seeded
pub struct SpherePointGenerator {
    rng: StdRng,
    center: [f32; 3],
    radius: f32,
    size_range: (f32, f32),
}

impl SpherePointGenerator {
    pub fn new(seed: u64, center: [f32; 3], radius: f32, size_range: (f32, f32)) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            center,
            radius,
            size_range,
        }
    }

    /// Demo generator around the origin using the configured parameters
    pub fn from_config(config: &PointCloudConfig) -> Self {
        Self::new(
            config.seed,
            [0.0; 3],
            config.spawn_radius,
            config.point_size_range,
        )
    }

    /// Rejection-sample a point in the unit ball
    fn inside_unit_sphere(&mut self) -> [f32; 3] {
        loop {
            let p = [
                self.rng.gen_range(-1.0f32..=1.0),
                self.rng.gen_range(-1.0f32..=1.0),
                self.rng.gen_range(-1.0f32..=1.0),
            ];
            if p[0] * p[0] + p[1] * p[1] + p[2] * p[2] <= 1.0 {
                return p;
            }
        }
    }
}

impl PointGenerator for SpherePointGenerator {
    fn generate(&mut self, _index: u32) -> PointRecord {
        let unit = self.inside_unit_sphere();
        let position = [
            self.center[0] + unit[0] * self.radius,
            self.center[1] + unit[1] * self.radius,
            self.center[2] + unit[2] * self.radius,
        ];

        let (min_size, max_size) = self.size_range;
        let size = self.rng.gen_range(min_size..=max_size);
        let color = [self.rng.gen(), self.rng.gen(), self.rng.gen(), 1.0];

        PointRecord::new(position, size, color)
    }
}

/// Collect `count` records from a generator
pub fn generate_points<G>(generator: &mut G, count: u32) -> Vec<PointRecord>
where
    G: PointGenerator + ?Sized,
{
    (0..count).map(|i| generator.generate(i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_stay_inside_sphere_and_size_range() {
        let mut generator = SpherePointGenerator::new(7, [1.0, 2.0, 3.0], 50.0, (0.1, 2.0));
        let points = generate_points(&mut generator, 2_000);

        assert_eq!(points.len(), 2_000);
        for p in &points {
            let d = ((p.position[0] - 1.0).powi(2)
                + (p.position[1] - 2.0).powi(2)
                + (p.position[2] - 3.0).powi(2))
            .sqrt();
            assert!(d <= 50.0 + 1e-3, "point outside sphere: {:?}", p);
            assert!(p.size >= 0.1 && p.size <= 2.0);
            assert_eq!(p.color[3], 1.0);
            assert!(p.color[..3].iter().all(|c| (0.0..1.0).contains(c)));
        }
    }

    #[test]
    fn test_same_seed_same_points() {
        let config = PointCloudConfig::default();
        let a = generate_points(&mut SpherePointGenerator::from_config(&config), 100);
        let b = generate_points(&mut SpherePointGenerator::from_config(&config), 100);
        assert_eq!(a, b);

        let other = PointCloudConfig {
            seed: config.seed + 1,
            ..config
        };
        let c = generate_points(&mut SpherePointGenerator::from_config(&other), 100);
        assert_ne!(a, c);
    }

    #[test]
    fn test_degenerate_size_range() {
        let mut generator = SpherePointGenerator::new(1, [0.0; 3], 0.0, (0.5, 0.5));
        let p = generator.generate(0);
        assert_eq!(p.size, 0.5);
        assert_eq!(p.position, [0.0; 3]);
    }

    #[test]
    fn test_closure_generator() {
        let mut line = |i: u32| PointRecord::new([i as f32, 0.0, 0.0], 1.0, [1.0; 4]);
        let points = generate_points(&mut line, 3);
        assert_eq!(points[2].position, [2.0, 0.0, 0.0]);
    }
}
