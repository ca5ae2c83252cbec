//! Geometric shapes for swept obstruction tests

use bevy::prelude::*;

/// Blocking geometry a movement trace can run into.
///
/// The swept capsule is approximated by a sphere of its radius, the same
/// simplification the rest of the crate uses for pathfinding queries.
#[derive(Debug, Clone, PartialEq)]
pub enum CollisionShape {
    Sphere { radius: f32 },
    Cuboid { half_extents: Vec3 },
}

impl CollisionShape {
    /// Does a sphere of radius `inflate` swept from `from` to `to` hit this
    /// shape placed at `center`?
    pub fn blocks_segment(&self, center: Vec3, from: Vec3, to: Vec3, inflate: f32) -> bool {
        match self {
            CollisionShape::Sphere { radius } => {
                segment_point_distance(from, to, center) <= radius + inflate
            }
            CollisionShape::Cuboid { half_extents } => {
                // Inflating the box by the sweep radius turns the swept-sphere
                // test into a plain segment-vs-box test
                let inflated = *half_extents + Vec3::splat(inflate);
                segment_hits_aabb(from - center, to - center, inflated)
            }
        }
    }

    /// Conservative world-space bounds for spatial pruning
    pub fn approximate_bounds(&self, center: Vec3) -> (Vec3, Vec3) {
        match self {
            CollisionShape::Sphere { radius } => {
                let extent = Vec3::splat(*radius);
                (center - extent, center + extent)
            }
            CollisionShape::Cuboid { half_extents } => {
                (center - *half_extents, center + *half_extents)
            }
        }
    }
}

/// Distance from point `p` to the segment `a`-`b`
fn segment_point_distance(a: Vec3, b: Vec3, p: Vec3) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Slab test for a segment against an origin-centered AABB
fn segment_hits_aabb(from: Vec3, to: Vec3, half_extents: Vec3) -> bool {
    let d = to - from;
    let mut t_min = 0.0_f32;
    let mut t_max = 1.0_f32;

    for axis in 0..3 {
        let (origin, dir, extent) = (from[axis], d[axis], half_extents[axis]);
        if dir.abs() <= f32::EPSILON {
            if origin.abs() > extent {
                return false;
            }
            continue;
        }
        let inv = 1.0 / dir;
        let mut t0 = (-extent - origin) * inv;
        let mut t1 = (extent - origin) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_blocks_segment() {
        let shape = CollisionShape::Sphere { radius: 0.5 };
        let center = Vec3::new(1.0, 0.0, 0.0);

        // Segment passing straight through the sphere
        assert!(shape.blocks_segment(center, Vec3::new(-2.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0), 0.0));
        // Segment passing well clear of it
        assert!(!shape.blocks_segment(center, Vec3::new(-2.0, 2.0, 0.0), Vec3::new(2.0, 2.0, 0.0), 0.0));
        // Clear without inflation, hit once the sweep radius is added
        let grazing_from = Vec3::new(-2.0, 0.8, 0.0);
        let grazing_to = Vec3::new(2.0, 0.8, 0.0);
        assert!(!shape.blocks_segment(center, grazing_from, grazing_to, 0.0));
        assert!(shape.blocks_segment(center, grazing_from, grazing_to, 0.4));
    }

    #[test]
    fn test_sphere_blocks_degenerate_segment() {
        let shape = CollisionShape::Sphere { radius: 0.5 };
        let p = Vec3::new(0.3, 0.0, 0.0);
        // Zero-length segment inside the sphere
        assert!(shape.blocks_segment(Vec3::ZERO, p, p, 0.0));
    }

    #[test]
    fn test_cuboid_blocks_segment() {
        let shape = CollisionShape::Cuboid {
            half_extents: Vec3::new(0.5, 1.0, 0.5),
        };
        let center = Vec3::new(0.0, 0.0, 0.0);

        assert!(shape.blocks_segment(center, Vec3::new(-2.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0), 0.0));
        assert!(!shape.blocks_segment(center, Vec3::new(-2.0, 0.0, 2.0), Vec3::new(2.0, 0.0, 2.0), 0.0));
        // Sweep radius closes the gap
        assert!(shape.blocks_segment(center, Vec3::new(-2.0, 0.0, 0.8), Vec3::new(2.0, 0.0, 0.8), 0.4));
    }

    #[test]
    fn test_cuboid_segment_parallel_to_face() {
        let shape = CollisionShape::Cuboid {
            half_extents: Vec3::splat(0.5),
        };
        // Runs parallel to the X face, outside the box
        assert!(!shape.blocks_segment(
            Vec3::ZERO,
            Vec3::new(1.0, -2.0, 0.0),
            Vec3::new(1.0, 2.0, 0.0),
            0.0
        ));
        // Same line but inside the slab
        assert!(shape.blocks_segment(
            Vec3::ZERO,
            Vec3::new(0.2, -2.0, 0.0),
            Vec3::new(0.2, 2.0, 0.0),
            0.0
        ));
    }

    #[test]
    fn test_approximate_bounds() {
        let sphere = CollisionShape::Sphere { radius: 2.0 };
        let (min, max) = sphere.approximate_bounds(Vec3::new(5.0, 0.0, 5.0));
        assert_eq!(min, Vec3::new(3.0, -2.0, 3.0));
        assert_eq!(max, Vec3::new(7.0, 2.0, 7.0));

        let cuboid = CollisionShape::Cuboid {
            half_extents: Vec3::new(1.0, 2.0, 1.5),
        };
        let (min, max) = cuboid.approximate_bounds(Vec3::ZERO);
        assert_eq!(min, Vec3::new(-1.0, -2.0, -1.5));
        assert_eq!(max, Vec3::new(1.0, 2.0, 1.5));
    }
}
