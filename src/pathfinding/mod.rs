//! Budget-bounded single-source search over the tile graph
//!
//! One search produces a [`PathField`]: the cheapest distance to every tile a
//! pawn can reach this turn, plus the backpointer tree the curve assembly
//! walks. The field is scratch state owned by the caller, so concurrent
//! searches over the same grid never interfere.

use crate::collision::CollisionQuery;
use crate::errors::{NavGridError, NavResult};
use crate::grid::{NavGrid, TileId};
use crate::pawn::PawnProfile;
use bevy::prelude::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Heap entry ordered so [`BinaryHeap`] pops the cheapest frontier tile first.
/// Ties break on tile index to keep expansion order deterministic.
#[derive(Debug, Clone, Copy)]
struct FrontierEntry {
    distance: f32,
    tile: TileId,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.tile.index().cmp(&self.tile.index()))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

/// Result of one search: per-tile cheapest distances and the backpointer
/// tree rooted at the start tile
#[derive(Debug, Clone)]
pub struct PathField {
    start: TileId,
    distance: Vec<f32>,
    backpointer: Vec<Option<TileId>>,
}

impl PathField {
    pub fn start(&self) -> TileId {
        self.start
    }

    /// Cheapest accumulated cost to reach a tile, if it is reachable
    pub fn distance(&self, id: TileId) -> Option<f32> {
        self.distance
            .get(id.index())
            .copied()
            .filter(|d| d.is_finite())
    }

    pub fn is_reachable(&self, id: TileId) -> bool {
        self.distance(id).is_some()
    }

    /// Every tile the search reached, the start included
    pub fn reachable_tiles(&self) -> Vec<TileId> {
        self.distance
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_finite())
            .map(|(index, _)| TileId::from_index(index))
            .collect()
    }

    /// Reachable tiles a pawn may stop on: the start tile is excluded (the
    /// pawn already stands there) and so is every tile that only permits
    /// passing through, ladders among them.
    pub fn end_of_turn_tiles(&self, grid: &NavGrid, pawn: &PawnProfile) -> Vec<TileId> {
        self.reachable_tiles()
            .into_iter()
            .filter(|&id| {
                id != self.start
                    && grid.tile(id).is_some_and(|tile| {
                        tile.legal_end_position(pawn.max_walk_angle, pawn.movement_modes)
                    })
            })
            .collect()
    }

    /// Tile sequence from the start to `destination`, both inclusive.
    /// `None` when the destination was not reached.
    pub fn path_to(&self, destination: TileId) -> Option<Vec<TileId>> {
        if !self.is_reachable(destination) {
            return None;
        }
        let mut order = vec![destination];
        let mut current = destination;
        while let Some(previous) = self.backpointer.get(current.index()).copied().flatten() {
            order.push(previous);
            current = previous;
        }
        order.reverse();
        Some(order)
    }
}

/// Compute the movement options for one pawn standing on `start`.
///
/// Classic uniform-cost search with lazy deletion: stale heap entries are
/// skipped on pop instead of being rewritten in place. A neighbour joins the
/// frontier only if the pawn's modes and walk angle permit the tile, nothing
/// obstructs the step onto it, and the accumulated cost stays within
/// `budget`. Positive tile costs guarantee termination.
pub fn plan_moves(
    grid: &NavGrid,
    collision: &dyn CollisionQuery,
    start: TileId,
    pawn: &PawnProfile,
    budget: f32,
) -> NavResult<PathField> {
    grid.tile(start).ok_or(NavGridError::UnknownTile(start))?;

    let slots = grid.slot_count();
    let mut field = PathField {
        start,
        distance: vec![f32::INFINITY; slots],
        backpointer: vec![None; slots],
    };
    field.distance[start.index()] = 0.0;

    let mut visited = vec![false; slots];
    let mut frontier = BinaryHeap::new();
    frontier.push(FrontierEntry {
        distance: 0.0,
        tile: start,
    });

    while let Some(FrontierEntry { distance, tile }) = frontier.pop() {
        if std::mem::replace(&mut visited[tile.index()], true) {
            continue;
        }
        let Some(current) = grid.tile(tile) else {
            continue;
        };

        for neighbour_id in current.unobstructed_neighbours(grid, &pawn.capsule, collision) {
            let Some(neighbour) = grid.tile(neighbour_id) else {
                continue;
            };
            if !neighbour.traversable(pawn.max_walk_angle, pawn.movement_modes) {
                continue;
            }
            let candidate = distance + neighbour.data().cost();
            if candidate > budget || candidate >= field.distance[neighbour_id.index()] {
                continue;
            }
            field.distance[neighbour_id.index()] = candidate;
            field.backpointer[neighbour_id.index()] = Some(tile);
            frontier.push(FrontierEntry {
                distance: candidate,
                tile: neighbour_id,
            });
        }
    }

    debug!(
        "movement search from {start}: {reachable} of {total} tiles within budget {budget}",
        reachable = field.reachable_tiles().len(),
        total = grid.tile_count()
    );
    Ok(field)
}
