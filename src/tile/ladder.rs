//! Ladder tile: vertical traversal between two ground levels
//!
//! A ladder has two internal anchor points (top and bottom). Obstruction
//! traces, neighbour filtering and spline contributions all pick whichever
//! anchor is nearer, so the shared pathfinding and path-assembly code never
//! needs to know the tile is vertical.

use crate::collision::CollisionQuery;
use crate::config::NavGridSettings;
use crate::grid::{NavGrid, TileId};
use crate::path::{NavPath, PathSegment};
use crate::pawn::{ModeSet, PawnCapsule};
use crate::tile::{NavTile, TileData};
use bevy::prelude::*;

#[derive(Debug, Clone)]
pub struct LadderTile {
    data: TileData,
    /// Anchor points in tile-local space, derived from the grid's tile size
    bottom_local: Vec3,
    top_local: Vec3,
}

impl LadderTile {
    pub fn new(transform: Transform, extent: Vec3) -> Self {
        let mut data = TileData::new(transform, extent);
        data.movement_modes = ModeSet::CLIMB;
        Self {
            data,
            bottom_local: Vec3::ZERO,
            top_local: Vec3::ZERO,
        }
    }

    pub fn bottom_anchor(&self) -> Vec3 {
        self.data.transform.transform_point(self.bottom_local)
    }

    pub fn top_anchor(&self) -> Vec3 {
        self.data.transform.transform_point(self.top_local)
    }

    /// The anchor a trace touching this ladder should go through,
    /// straight-line distance as the tie-break
    fn nearest_anchor(&self, from: Vec3) -> Vec3 {
        let top = self.top_anchor();
        let bottom = self.bottom_anchor();
        if from.distance(top) < from.distance(bottom) {
            top
        } else {
            bottom
        }
    }
}

impl NavTile for LadderTile {
    fn data(&self) -> &TileData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut TileData {
        &mut self.data
    }

    fn refresh_geometry(&mut self, settings: &NavGridSettings) {
        let tile_size = settings.tile_size;
        let inset = settings.ladder_anchor_inset;
        let extent = self.data.extent;

        // Widen the query shape along the grid axes so the ladder overlaps
        // the ground tiles at its ends
        let mut query = extent;
        query.x = query.x.max(tile_size / 2.0);
        query.z = query.z.max(tile_size);
        self.data.neighbourhood_extent = query + Vec3::splat(settings.neighbourhood_margin);

        // Anchors sit half a tile out from the rungs, inset from the ends
        let forward = tile_size / 2.0;
        self.bottom_local = Vec3::new(0.0, 2.0 * inset - extent.y, forward);
        self.top_local = Vec3::new(0.0, extent.y - inset, forward);
        self.data.pawn_location_offset = Vec3::new(0.0, 0.0, forward);
    }

    /// Midpoint of the two anchors
    fn pawn_location(&self) -> Vec3 {
        (self.bottom_anchor() + self.top_anchor()) / 2.0
    }

    /// Ladders are mode-gated; walk angle does not apply to them
    fn traversable(&self, _max_walk_angle: f32, pawn_modes: ModeSet) -> bool {
        self.data.movement_modes.intersects(pawn_modes)
    }

    /// A pawn cannot end its turn hanging from a ladder
    fn legal_end_position(&self, _max_walk_angle: f32, _pawn_modes: ModeSet) -> bool {
        false
    }

    fn obstructed(&self, from: Vec3, capsule: &PawnCapsule, collision: &dyn CollisionQuery) -> bool {
        let anchor = self.nearest_anchor(from);
        collision.sweep_blocked(from + capsule.offset, anchor + capsule.offset, capsule)
    }

    fn unobstructed_neighbours(
        &self,
        grid: &NavGrid,
        capsule: &PawnCapsule,
        collision: &dyn CollisionQuery,
    ) -> Vec<TileId> {
        // Unlike the base tile there is no single trace origin: each
        // neighbour is traced from whichever anchor is closer to it
        self.data
            .neighbours
            .iter()
            .copied()
            .filter(|&id| {
                grid.tile(id).is_some_and(|neighbour| {
                    let origin = self.nearest_anchor(neighbour.pawn_location());
                    !neighbour.obstructed(origin, capsule, collision)
                })
            })
            .collect()
    }

    fn add_path_segments(&self, path: &mut NavPath, end_tile: bool) {
        let entry = path.last_point().unwrap_or_else(|| self.pawn_location());
        let top = self.top_anchor();
        let bottom = self.bottom_anchor();

        // Climb from the nearer anchor to the farther one
        let (first, second) = if entry.distance(top) > entry.distance(bottom) {
            (bottom, top)
        } else {
            (top, bottom)
        };

        path.add_point(first);
        let start = path.length();
        path.add_point(second);

        if end_tile {
            // Terminate exactly where the pawn stands rather than at an anchor
            path.replace_last_point(self.pawn_location());
        }
        let end = path.length();

        // The pawn must not switch movement mode before reaching the first
        // anchor, so the previous segment is extended to that point
        path.extend_last_segment_to(start);

        path.push_segment(PathSegment {
            movement_modes: self.data.movement_modes,
            rotation_hint: self.data.transform.rotation
                * Quat::from_rotation_y(std::f32::consts::PI),
            start,
            end,
        });
    }

    /// Outward face normal, away from the rungs
    fn spline_up_vector(&self) -> Vec3 {
        self.data.transform.rotation * Vec3::Z
    }
}
