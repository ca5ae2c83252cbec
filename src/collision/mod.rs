//! Collision queries used by neighbour discovery and obstruction tests
//!
//! The navigation core never talks to a physics engine directly. Everything it
//! needs is behind [`CollisionQuery`]; the in-crate [`ObstacleWorld`] is one
//! implementation, an engine-backed query pipeline can be another.

use crate::pawn::PawnCapsule;
use bevy::prelude::*;

pub mod obstacles;
pub mod shapes;

pub use obstacles::*;
pub use shapes::*;

/// The external collision-service seam.
pub trait CollisionQuery: Send + Sync {
    /// True if a capsule swept from `from` to `to` hits blocking geometry.
    ///
    /// Implementations must report degenerate queries (non-finite endpoints)
    /// as blocked so a pawn is never routed through untestable geometry.
    fn sweep_blocked(&self, from: Vec3, to: Vec3, capsule: &PawnCapsule) -> bool;
}

/// World-space AABB of an oriented box, ignoring transform scale
pub fn world_aabb(transform: &Transform, half_extents: Vec3) -> (Vec3, Vec3) {
    let m = Mat3::from_quat(transform.rotation);
    let abs = Mat3::from_cols(m.x_axis.abs(), m.y_axis.abs(), m.z_axis.abs());
    let extent = abs * half_extents;
    (
        transform.translation - extent,
        transform.translation + extent,
    )
}

/// Axis-aligned box overlap, inclusive at the boundary
pub fn aabb_overlap(min_a: Vec3, max_a: Vec3, min_b: Vec3, max_b: Vec3) -> bool {
    min_a.x <= max_b.x
        && min_b.x <= max_a.x
        && min_a.y <= max_b.y
        && min_b.y <= max_a.y
        && min_a.z <= max_b.z
        && min_b.z <= max_a.z
}
