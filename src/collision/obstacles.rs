//! Trait-based obstacle world implementing the collision-service seam

use crate::collision::{aabb_overlap, CollisionQuery, CollisionShape};
use crate::pawn::PawnCapsule;
use bevy::prelude::*;

/// Something that can block a movement trace
pub trait Obstacle: Send + Sync {
    fn collision_shape(&self) -> CollisionShape;

    fn world_position(&self) -> Vec3;

    /// Obstacles can opt out of blocking (decorative geometry)
    fn blocks_movement(&self) -> bool {
        true
    }
}

/// Type-erased obstacle for collections
pub type BoxedObstacle = Box<dyn Obstacle>;

/// A fixed obstacle placed directly in the world
#[derive(Debug, Clone)]
pub struct StaticObstacle {
    pub position: Vec3,
    pub shape: CollisionShape,
}

impl Obstacle for StaticObstacle {
    fn collision_shape(&self) -> CollisionShape {
        self.shape.clone()
    }

    fn world_position(&self) -> Vec3 {
        self.position
    }
}

/// Set of obstacles answering swept collision queries
#[derive(Default)]
pub struct ObstacleWorld {
    obstacles: Vec<BoxedObstacle>,
}

impl ObstacleWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, obstacle: BoxedObstacle) {
        self.obstacles.push(obstacle);
    }

    pub fn add_sphere(&mut self, position: Vec3, radius: f32) {
        self.add(Box::new(StaticObstacle {
            position,
            shape: CollisionShape::Sphere { radius },
        }));
    }

    pub fn add_cuboid(&mut self, position: Vec3, half_extents: Vec3) {
        self.add(Box::new(StaticObstacle {
            position,
            shape: CollisionShape::Cuboid { half_extents },
        }));
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

impl CollisionQuery for ObstacleWorld {
    fn sweep_blocked(&self, from: Vec3, to: Vec3, capsule: &PawnCapsule) -> bool {
        // Untestable geometry blocks movement rather than erroring out
        if !from.is_finite() || !to.is_finite() {
            return true;
        }
        // Broad phase: the trace's bounds, grown by the sweep radius
        let trace_min = from.min(to) - Vec3::splat(capsule.radius);
        let trace_max = from.max(to) + Vec3::splat(capsule.radius);
        self.obstacles.iter().any(|obstacle| {
            if !obstacle.blocks_movement() {
                return false;
            }
            let shape = obstacle.collision_shape();
            let center = obstacle.world_position();
            let (min, max) = shape.approximate_bounds(center);
            aabb_overlap(trace_min, trace_max, min, max)
                && shape.blocks_segment(center, from, to, capsule.radius)
        })
    }
}

/// Collision service for open terrain with nothing in the way
pub struct NoObstructions;

impl CollisionQuery for NoObstructions {
    fn sweep_blocked(&self, from: Vec3, to: Vec3, _capsule: &PawnCapsule) -> bool {
        !from.is_finite() || !to.is_finite()
    }
}
