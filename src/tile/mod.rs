//! Tiles: nodes of the navigation graph
//!
//! The graph search and path assembly are written once against the [`NavTile`]
//! capability trait. Tile variants only supply geometry and topology
//! specifics, so a new tile type never touches the search or curve code.

use crate::collision::CollisionQuery;
use crate::config::NavGridSettings;
use crate::errors::{NavGridError, NavResult};
use crate::grid::{NavGrid, TileId};
use crate::path::{NavPath, PathSegment};
use crate::pawn::{ModeSet, PawnCapsule};
use bevy::prelude::*;
use derive_more::Display;
use serde::{Deserialize, Serialize};

pub mod ground;
pub mod ladder;

pub use ground::*;
pub use ladder::*;

/// Cost of moving into a tile. Always positive and finite; a zero-cost cycle
/// would break the search's termination guarantee, so this is rejected at
/// configuration time.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
pub struct Cost(f32);

impl Cost {
    pub fn new(value: f32) -> NavResult<Self> {
        if value > 0.0 && value.is_finite() {
            Ok(Self(value))
        } else {
            Err(NavGridError::NonPositiveCost { cost: value })
        }
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for Cost {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Highlight state a presentation layer can render for a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HighlightKind {
    #[default]
    None,
    Reachable,
    Path,
    Hovered,
}

/// Persistent state shared by every tile variant
#[derive(Debug, Clone)]
pub struct TileData {
    /// World-space placement (position + orientation)
    pub transform: Transform,
    /// Half extents of the tile's bounding box
    pub extent: Vec3,
    cost: Cost,
    /// Movement modes that are legal (or make sense) for this tile
    pub movement_modes: ModeSet,
    /// Local-space placement offset for a pawn occupying this tile
    pub pawn_location_offset: Vec3,
    /// Half extents of the adjacency query shape, derived on geometry change
    pub(crate) neighbourhood_extent: Vec3,
    pub(crate) neighbours: Vec<TileId>,
    pub(crate) highlight: HighlightKind,
}

impl TileData {
    pub fn new(transform: Transform, extent: Vec3) -> Self {
        Self {
            transform,
            extent,
            cost: Cost::default(),
            movement_modes: ModeSet::WALK,
            pawn_location_offset: Vec3::ZERO,
            neighbourhood_extent: extent,
            neighbours: Vec::new(),
            highlight: HighlightKind::None,
        }
    }

    pub fn cost(&self) -> f32 {
        self.cost.get()
    }

    pub fn set_cost(&mut self, cost: f32) -> NavResult<()> {
        self.cost = Cost::new(cost)?;
        Ok(())
    }

    /// Spatially adjacent tiles, discovered rather than declared
    pub fn neighbours(&self) -> &[TileId] {
        &self.neighbours
    }

    pub fn highlight(&self) -> HighlightKind {
        self.highlight
    }

    pub(crate) fn add_neighbour(&mut self, id: TileId) {
        if !self.neighbours.contains(&id) {
            self.neighbours.push(id);
        }
    }

    pub(crate) fn remove_neighbour(&mut self, id: TileId) {
        self.neighbours.retain(|&n| n != id);
    }

    /// Is a world-space point inside this tile's bounding box?
    pub fn contains_point(&self, point: Vec3) -> bool {
        let local = self.transform.rotation.inverse() * (point - self.transform.translation);
        local.x.abs() <= self.extent.x
            && local.y.abs() <= self.extent.y
            && local.z.abs() <= self.extent.z
    }
}

/// Capability contract every tile variant implements.
///
/// Default methods carry the base-tile behaviour; variants with special
/// geometry (see [`LadderTile`]) override exactly the methods whose semantics
/// differ.
pub trait NavTile: Send + Sync {
    fn data(&self) -> &TileData;

    fn data_mut(&mut self) -> &mut TileData;

    /// Recompute derived geometry. The grid calls this after construction and
    /// after every move or resize, before neighbours are rediscovered.
    fn refresh_geometry(&mut self, settings: &NavGridSettings) {
        let margin = settings.neighbourhood_margin;
        let data = self.data_mut();
        data.neighbourhood_extent = data.extent + Vec3::splat(margin);
    }

    /// World-space point where a pawn occupying this tile stands
    fn pawn_location(&self) -> Vec3 {
        let data = self.data();
        data.transform.transform_point(data.pawn_location_offset)
    }

    /// Angle between the tile's surface normal and world up, in degrees
    fn surface_angle(&self) -> f32 {
        let up = self.data().transform.rotation * Vec3::Y;
        up.dot(Vec3::Y).clamp(-1.0, 1.0).acos().to_degrees()
    }

    /// Can a pawn with these capabilities move across this tile?
    fn traversable(&self, max_walk_angle: f32, pawn_modes: ModeSet) -> bool {
        self.surface_angle() <= max_walk_angle
            && self.data().movement_modes.intersects(pawn_modes)
    }

    /// Can a pawn end its turn standing on this tile? May differ from
    /// mid-path traversability.
    fn legal_end_position(&self, max_walk_angle: f32, pawn_modes: ModeSet) -> bool {
        self.traversable(max_walk_angle, pawn_modes)
    }

    /// Is anything blocking a pawn moving from `from` onto this tile?
    fn obstructed(&self, from: Vec3, capsule: &PawnCapsule, collision: &dyn CollisionQuery) -> bool {
        collision.sweep_blocked(
            from + capsule.offset,
            self.pawn_location() + capsule.offset,
            capsule,
        )
    }

    /// The neighbours a pawn can actually step to from here
    fn unobstructed_neighbours(
        &self,
        grid: &NavGrid,
        capsule: &PawnCapsule,
        collision: &dyn CollisionQuery,
    ) -> Vec<TileId> {
        let origin = self.pawn_location();
        self.data()
            .neighbours
            .iter()
            .copied()
            .filter(|&id| {
                grid.tile(id)
                    .is_some_and(|neighbour| !neighbour.obstructed(origin, capsule, collision))
            })
            .collect()
    }

    /// Append this tile's contribution to the output curve and segment list.
    /// `end_tile` is true only for the last tile of the path.
    fn add_path_segments(&self, path: &mut NavPath, end_tile: bool) {
        let _ = end_tile;
        let data = self.data();
        let start = path.length();
        path.add_point(self.pawn_location());
        path.push_segment(PathSegment {
            movement_modes: data.movement_modes,
            rotation_hint: data.transform.rotation,
            start,
            end: path.length(),
        });
    }

    /// Up vector for a spline mesh moving across this tile
    fn spline_up_vector(&self) -> Vec3 {
        self.data().transform.rotation * Vec3::Y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_rejects_non_positive_values() {
        assert!(Cost::new(1.5).is_ok());
        assert!(matches!(
            Cost::new(0.0),
            Err(NavGridError::NonPositiveCost { .. })
        ));
        assert!(Cost::new(-1.0).is_err());
        assert!(Cost::new(f32::NAN).is_err());
        assert!(Cost::new(f32::INFINITY).is_err());
    }

    #[test]
    fn test_tile_data_neighbour_set_is_deduplicated() {
        let mut data = TileData::new(Transform::IDENTITY, Vec3::splat(0.5));
        let id = TileId::from_index(1);

        data.add_neighbour(id);
        data.add_neighbour(id);
        assert_eq!(data.neighbours(), &[id]);

        data.remove_neighbour(id);
        assert!(data.neighbours().is_empty());
    }

    #[test]
    fn test_contains_point() {
        let data = TileData::new(Transform::from_xyz(2.0, 0.0, 0.0), Vec3::new(0.5, 0.1, 0.5));
        assert!(data.contains_point(Vec3::new(2.2, 0.05, -0.3)));
        assert!(!data.contains_point(Vec3::new(2.8, 0.0, 0.0)));
        assert!(!data.contains_point(Vec3::new(2.0, 0.5, 0.0)));
    }

    #[test]
    fn test_contains_point_rotated() {
        let transform = Transform::from_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_4));
        let data = TileData::new(transform, Vec3::new(1.0, 0.1, 0.1));
        // Along the rotated X axis
        let diag = (2.0_f32).sqrt() / 2.0;
        assert!(data.contains_point(Vec3::new(0.9 * diag, 0.0, -0.9 * diag)));
        assert!(!data.contains_point(Vec3::new(0.9, 0.0, 0.0)));
    }

    #[test]
    fn test_surface_angle_and_traversability() {
        let flat = GroundTile::new(Transform::IDENTITY, Vec3::splat(0.5));
        assert!(flat.surface_angle() < 1e-3);
        assert!(flat.traversable(45.0, ModeSet::WALK));

        // 60 degree slope is too steep for a 45 degree walker
        let steep = GroundTile::new(
            Transform::from_rotation(Quat::from_rotation_x(60.0_f32.to_radians())),
            Vec3::splat(0.5),
        );
        assert!((steep.surface_angle() - 60.0).abs() < 1e-3);
        assert!(!steep.traversable(45.0, ModeSet::WALK));
        assert!(steep.traversable(75.0, ModeSet::WALK));
    }

    #[test]
    fn test_traversable_requires_mode_overlap() {
        let tile = GroundTile::new(Transform::IDENTITY, Vec3::splat(0.5));
        assert!(!tile.traversable(45.0, ModeSet::CLIMB));
        assert!(!tile.traversable(45.0, ModeSet::EMPTY));
    }

    #[test]
    fn test_pawn_location_applies_offset_and_rotation() {
        let mut tile = GroundTile::new(
            Transform::from_xyz(1.0, 0.0, 0.0)
                .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
            Vec3::splat(0.5),
        );
        tile.data_mut().pawn_location_offset = Vec3::new(0.0, 0.5, 1.0);

        let location = tile.pawn_location();
        // Local +Z rotates onto world +X under a quarter turn around Y
        assert!((location - Vec3::new(2.0, 0.5, 0.0)).length() < 1e-5);
    }
}
