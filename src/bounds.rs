/// Data-Oriented Axis-Aligned Bounding Box
///
/// Pure data plus free functions. Used for the conservative render bounds of
/// the point cloud and for the exact extent of the uploaded points.
use serde::{Deserialize, Serialize};

/// Axis-Aligned Bounding Box - pure data structure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

/// Create AABB from min/max corners
pub fn create_aabb(min: [f32; 3], max: [f32; 3]) -> Aabb {
    Aabb { min, max }
}

/// Create AABB from center point and half extents
pub fn aabb_from_center_half_extents(center: [f32; 3], half_extents: [f32; 3]) -> Aabb {
    Aabb {
        min: [
            center[0] - half_extents[0],
            center[1] - half_extents[1],
            center[2] - half_extents[2],
        ],
        max: [
            center[0] + half_extents[0],
            center[1] + half_extents[1],
            center[2] + half_extents[2],
        ],
    }
}

/// Smallest AABB enclosing every position, `None` for an empty set
pub fn aabb_from_points<I>(points: I) -> Option<Aabb>
where
    I: IntoIterator<Item = [f32; 3]>,
{
    let mut iter = points.into_iter();
    let first = iter.next()?;
    let mut aabb = Aabb {
        min: first,
        max: first,
    };

    for p in iter {
        for axis in 0..3 {
            aabb.min[axis] = aabb.min[axis].min(p[axis]);
            aabb.max[axis] = aabb.max[axis].max(p[axis]);
        }
    }

    Some(aabb)
}

/// Center point of AABB
pub fn aabb_center(aabb: &Aabb) -> [f32; 3] {
    [
        (aabb.min[0] + aabb.max[0]) * 0.5,
        (aabb.min[1] + aabb.max[1]) * 0.5,
        (aabb.min[2] + aabb.max[2]) * 0.5,
    ]
}

/// Whether min <= max on every axis and all coordinates are finite
pub fn aabb_is_valid(aabb: &Aabb) -> bool {
    (0..3).all(|axis| {
        aabb.min[axis].is_finite() && aabb.max[axis].is_finite() && aabb.min[axis] <= aabb.max[axis]
    })
}

/// Test if AABB contains a point (inclusive)
pub fn aabb_contains_point(aabb: &Aabb, point: [f32; 3]) -> bool {
    (0..3).all(|axis| point[axis] >= aabb.min[axis] && point[axis] <= aabb.max[axis])
}

/// Test if `outer` fully contains `inner` (inclusive)
pub fn aabb_contains_aabb(outer: &Aabb, inner: &Aabb) -> bool {
    aabb_contains_point(outer, inner.min) && aabb_contains_point(outer, inner.max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let aabb = aabb_from_points(vec![[1.0, -2.0, 3.0], [-1.0, 4.0, 0.5], [0.0, 0.0, 0.0]])
            .expect("non-empty input");
        assert_eq!(aabb.min, [-1.0, -2.0, 0.0]);
        assert_eq!(aabb.max, [1.0, 4.0, 3.0]);

        assert!(aabb_from_points(Vec::<[f32; 3]>::new()).is_none());
    }

    #[test]
    fn test_containment() {
        let outer = aabb_from_center_half_extents([0.0; 3], [500.0; 3]);
        let inner = create_aabb([-50.0; 3], [50.0; 3]);
        assert!(aabb_contains_aabb(&outer, &inner));
        assert!(!aabb_contains_aabb(&inner, &outer));

        // Touching faces count as contained
        assert!(aabb_contains_point(&inner, [50.0, -50.0, 0.0]));
        assert!(!aabb_contains_point(&inner, [50.1, 0.0, 0.0]));
        assert_eq!(aabb_center(&inner), [0.0; 3]);
    }

    #[test]
    fn test_validity() {
        assert!(aabb_is_valid(&create_aabb([0.0; 3], [0.0; 3])));
        assert!(!aabb_is_valid(&create_aabb([1.0, 0.0, 0.0], [0.0; 3])));
        assert!(!aabb_is_valid(&create_aabb([f32::NAN, 0.0, 0.0], [1.0; 3])));
    }
}
