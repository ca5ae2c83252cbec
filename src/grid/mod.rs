//! The tile graph: tile ownership, lookup and neighbour discovery

use crate::collision::{aabb_overlap, world_aabb};
use crate::config::NavGridSettings;
use crate::errors::{NavGridError, NavResult};
use crate::tile::{HighlightKind, NavTile, TileData};
use bevy::prelude::*;
use derive_more::Display;
use validator::Validate;

/// Stable handle of a tile slot in the grid's arena.
///
/// Backpointers and neighbour sets hold these instead of owning references,
/// so path trees over shared tile storage never form ownership cycles.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileId(usize);

impl TileId {
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Notification that a tile's highlight changed, for presentation layers
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileHighlightChanged {
    pub tile: TileId,
    pub highlight: HighlightKind,
}

/// Owns the navigation tiles and keeps their adjacency up to date.
///
/// Grid mutation, neighbour discovery, pathfinding and path assembly are
/// synchronous and not meant for concurrent use on the same grid.
#[derive(Resource)]
pub struct NavGrid {
    tiles: Vec<Option<Box<dyn NavTile>>>,
    settings: NavGridSettings,
    /// Tiles whose geometry changed since the last discovery pass
    dirty: Vec<TileId>,
    highlight_events: Vec<TileHighlightChanged>,
}

impl NavGrid {
    pub fn new(settings: NavGridSettings) -> NavResult<Self> {
        settings.validate()?;
        Ok(Self {
            tiles: Vec::new(),
            settings,
            dirty: Vec::new(),
            highlight_events: Vec::new(),
        })
    }

    pub fn settings(&self) -> &NavGridSettings {
        &self.settings
    }

    /// Number of live tiles
    pub fn tile_count(&self) -> usize {
        self.tiles.iter().filter(|slot| slot.is_some()).count()
    }

    /// Arena capacity, counting freed slots. Per-search scratch state is
    /// sized from this.
    pub(crate) fn slot_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn tile_ids(&self) -> impl Iterator<Item = TileId> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|_| TileId(index)))
    }

    pub fn tile(&self, id: TileId) -> Option<&dyn NavTile> {
        self.tiles.get(id.0).and_then(|slot| slot.as_deref())
    }

    fn tile_data_mut(&mut self, id: TileId) -> Option<&mut TileData> {
        self.tiles
            .get_mut(id.0)
            .and_then(|slot| slot.as_deref_mut())
            .map(NavTile::data_mut)
    }

    /// Add a tile to the grid. Its neighbours are discovered on the next
    /// [`flush_geometry_changes`](Self::flush_geometry_changes).
    pub fn add_tile(&mut self, tile: impl NavTile + 'static) -> TileId {
        let boxed: Box<dyn NavTile> = Box::new(tile);
        let id = match self.tiles.iter().position(Option::is_none) {
            Some(free) => {
                self.tiles[free] = Some(boxed);
                TileId(free)
            }
            None => {
                self.tiles.push(Some(boxed));
                TileId(self.tiles.len() - 1)
            }
        };
        self.dirty.push(id);
        id
    }

    /// Remove a tile, scrub it from every neighbour set and queue the
    /// affected tiles for rediscovery
    pub fn remove_tile(&mut self, id: TileId) -> NavResult<()> {
        let tile = self
            .tiles
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(NavGridError::UnknownTile(id))?;

        for &neighbour in tile.data().neighbours() {
            if let Some(data) = self.tile_data_mut(neighbour) {
                data.remove_neighbour(id);
            }
            self.dirty.push(neighbour);
        }
        Ok(())
    }

    /// Move or reorient a tile; queues it for geometry refresh and
    /// neighbour rediscovery
    pub fn set_tile_transform(&mut self, id: TileId, transform: Transform) -> NavResult<()> {
        let data = self
            .tile_data_mut(id)
            .ok_or(NavGridError::UnknownTile(id))?;
        data.transform = transform;
        self.mark_geometry_changed(id);
        Ok(())
    }

    /// Resize a tile; queues it like a move does
    pub fn set_tile_extent(&mut self, id: TileId, extent: Vec3) -> NavResult<()> {
        let data = self
            .tile_data_mut(id)
            .ok_or(NavGridError::UnknownTile(id))?;
        data.extent = extent;
        self.mark_geometry_changed(id);
        Ok(())
    }

    /// Record that a tile's geometry changed through some other channel
    pub fn mark_geometry_changed(&mut self, id: TileId) {
        self.dirty.push(id);
    }

    pub fn has_pending_geometry_changes(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Run neighbour discovery for every tile queued since the last flush.
    ///
    /// Discovery is idempotent and touches only adjacency sets, so re-running
    /// it after any sequence of edits heals stale adjacency.
    pub fn flush_geometry_changes(&mut self) {
        while !self.dirty.is_empty() {
            let mut batch = std::mem::take(&mut self.dirty);
            batch.sort_unstable();
            batch.dedup();

            let settings = self.settings.clone();
            for &id in &batch {
                if let Some(tile) = self.tiles.get_mut(id.0).and_then(|slot| slot.as_deref_mut())
                {
                    tile.refresh_geometry(&settings);
                }
            }
            for &id in &batch {
                self.rebuild_neighbours(id);
            }
            debug!("neighbour discovery updated {} tiles", batch.len());
        }
    }

    /// Rebuild one tile's adjacency from a shape-overlap query.
    ///
    /// Adjacency holds when either tile's neighbourhood query shape reaches
    /// the other tile's bounds; both directions are recorded, which keeps the
    /// relation symmetric even for variants with widened query shapes.
    fn rebuild_neighbours(&mut self, id: TileId) {
        let Some(tile) = self.tile(id) else {
            return;
        };
        let data = tile.data();
        let query = world_aabb(&data.transform, data.neighbourhood_extent);
        let bounds = world_aabb(&data.transform, data.extent);
        let previous = data.neighbours().to_vec();

        let mut discovered: Vec<TileId> = Vec::new();
        for (index, slot) in self.tiles.iter().enumerate() {
            let Some(other) = slot.as_deref() else {
                continue;
            };
            let other_id = TileId(index);
            if other_id == id {
                continue;
            }
            let other_data = other.data();
            let other_bounds = world_aabb(&other_data.transform, other_data.extent);
            let other_query = world_aabb(&other_data.transform, other_data.neighbourhood_extent);
            if aabb_overlap(query.0, query.1, other_bounds.0, other_bounds.1)
                || aabb_overlap(other_query.0, other_query.1, bounds.0, bounds.1)
            {
                discovered.push(other_id);
            }
        }

        for &former in &previous {
            if !discovered.contains(&former) {
                if let Some(other) = self.tile_data_mut(former) {
                    other.remove_neighbour(id);
                }
            }
        }
        for &found in &discovered {
            if let Some(other) = self.tile_data_mut(found) {
                other.add_neighbour(id);
            }
        }
        if let Some(data) = self.tile_data_mut(id) {
            data.neighbours = discovered;
        }
    }

    /// Tile whose bounding box contains the given world point
    pub fn tile_at(&self, point: Vec3) -> Option<TileId> {
        self.tile_ids()
            .find(|&id| self.tile(id).is_some_and(|tile| tile.data().contains_point(point)))
    }

    /// Set the highlight a presentation layer should render for a tile
    pub fn set_highlight(&mut self, id: TileId, highlight: HighlightKind) -> NavResult<()> {
        let data = self
            .tile_data_mut(id)
            .ok_or(NavGridError::UnknownTile(id))?;
        data.highlight = highlight;
        self.highlight_events
            .push(TileHighlightChanged { tile: id, highlight });
        Ok(())
    }

    /// Take the highlight notifications queued since the last drain
    pub fn drain_highlight_events(&mut self) -> Vec<TileHighlightChanged> {
        std::mem::take(&mut self.highlight_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{GroundTile, LadderTile};

    fn ground(x: f32, y: f32, z: f32) -> GroundTile {
        GroundTile::new(Transform::from_xyz(x, y, z), Vec3::new(0.5, 0.05, 0.5))
    }

    fn line_grid(count: usize) -> (NavGrid, Vec<TileId>) {
        let mut grid = NavGrid::new(NavGridSettings::default()).unwrap();
        let ids = (0..count)
            .map(|i| grid.add_tile(ground(i as f32, 0.0, 0.0)))
            .collect();
        grid.flush_geometry_changes();
        (grid, ids)
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = NavGridSettings {
            tile_size: 0.0,
            ..NavGridSettings::default()
        };
        assert!(matches!(
            NavGrid::new(settings),
            Err(NavGridError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_neighbour_discovery_line() {
        let (grid, ids) = line_grid(3);

        let middle = grid.tile(ids[1]).unwrap().data();
        assert_eq!(middle.neighbours().len(), 2);
        assert!(middle.neighbours().contains(&ids[0]));
        assert!(middle.neighbours().contains(&ids[2]));

        // Ends only see the middle
        assert_eq!(grid.tile(ids[0]).unwrap().data().neighbours(), &[ids[1]]);
        assert_eq!(grid.tile(ids[2]).unwrap().data().neighbours(), &[ids[1]]);
    }

    #[test]
    fn test_adjacency_is_irreflexive_and_deduplicated() {
        let (grid, ids) = line_grid(4);
        for &id in &ids {
            let neighbours = grid.tile(id).unwrap().data().neighbours();
            assert!(!neighbours.contains(&id), "tile {id} neighbours itself");
            let mut sorted = neighbours.to_vec();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), neighbours.len(), "duplicates for tile {id}");
        }
    }

    #[test]
    fn test_discovery_is_idempotent() {
        let (mut grid, ids) = line_grid(3);
        let before: Vec<_> = ids
            .iter()
            .map(|&id| {
                let mut n = grid.tile(id).unwrap().data().neighbours().to_vec();
                n.sort_unstable();
                n
            })
            .collect();

        for &id in &ids {
            grid.mark_geometry_changed(id);
        }
        grid.flush_geometry_changes();

        for (&id, expected) in ids.iter().zip(&before) {
            let mut n = grid.tile(id).unwrap().data().neighbours().to_vec();
            n.sort_unstable();
            assert_eq!(&n, expected);
        }
    }

    #[test]
    fn test_isolated_tile_is_valid() {
        let mut grid = NavGrid::new(NavGridSettings::default()).unwrap();
        let lonely = grid.add_tile(ground(100.0, 0.0, 0.0));
        grid.flush_geometry_changes();
        assert!(grid.tile(lonely).unwrap().data().neighbours().is_empty());
    }

    #[test]
    fn test_removal_scrubs_neighbour_sets() {
        let (mut grid, ids) = line_grid(3);
        grid.remove_tile(ids[1]).unwrap();
        grid.flush_geometry_changes();

        assert!(grid.tile(ids[1]).is_none());
        assert!(grid.tile(ids[0]).unwrap().data().neighbours().is_empty());
        assert!(grid.tile(ids[2]).unwrap().data().neighbours().is_empty());
        assert_eq!(grid.tile_count(), 2);
    }

    #[test]
    fn test_removing_unknown_tile_is_an_error() {
        let (mut grid, ids) = line_grid(2);
        grid.remove_tile(ids[0]).unwrap();
        assert!(matches!(
            grid.remove_tile(ids[0]),
            Err(NavGridError::UnknownTile(_))
        ));
    }

    #[test]
    fn test_freed_slots_are_reused() {
        let (mut grid, ids) = line_grid(2);
        grid.remove_tile(ids[0]).unwrap();
        let replacement = grid.add_tile(ground(0.0, 0.0, 0.0));
        assert_eq!(replacement, ids[0]);
        grid.flush_geometry_changes();
        assert_eq!(grid.tile_count(), 2);
    }

    #[test]
    fn test_moving_a_tile_updates_adjacency_both_ways() {
        let (mut grid, ids) = line_grid(3);

        // Move the end tile far away; the middle tile must forget it
        grid.set_tile_transform(ids[2], Transform::from_xyz(50.0, 0.0, 0.0))
            .unwrap();
        grid.flush_geometry_changes();

        assert_eq!(grid.tile(ids[1]).unwrap().data().neighbours(), &[ids[0]]);
        assert!(grid.tile(ids[2]).unwrap().data().neighbours().is_empty());

        // Move it back and adjacency heals
        grid.set_tile_transform(ids[2], Transform::from_xyz(2.0, 0.0, 0.0))
            .unwrap();
        grid.flush_geometry_changes();
        assert_eq!(grid.tile(ids[1]).unwrap().data().neighbours().len(), 2);
    }

    #[test]
    fn test_ladder_widened_query_links_both_levels() {
        let mut grid = NavGrid::new(NavGridSettings::default()).unwrap();
        let lower = grid.add_tile(ground(0.0, 0.0, 0.0));
        let ladder = grid.add_tile(LadderTile::new(
            Transform::from_xyz(0.0, 1.0, 1.0),
            Vec3::new(0.5, 1.0, 0.1),
        ));
        let upper = grid.add_tile(ground(0.0, 2.1, 1.6));
        grid.flush_geometry_changes();

        let ladder_neighbours = grid.tile(ladder).unwrap().data().neighbours();
        assert!(ladder_neighbours.contains(&lower));
        assert!(ladder_neighbours.contains(&upper));

        // The widened ladder query produced a symmetric relation
        assert!(grid.tile(lower).unwrap().data().neighbours().contains(&ladder));
        assert!(grid.tile(upper).unwrap().data().neighbours().contains(&ladder));
        // The two ground levels are not direct neighbours
        assert!(!grid.tile(lower).unwrap().data().neighbours().contains(&upper));
    }

    #[test]
    fn test_tile_at() {
        let (grid, ids) = line_grid(3);
        assert_eq!(grid.tile_at(Vec3::new(1.1, 0.0, 0.2)), Some(ids[1]));
        assert_eq!(grid.tile_at(Vec3::new(10.0, 0.0, 0.0)), None);
    }

    #[test]
    fn test_highlight_events_are_queued_and_drained() {
        let (mut grid, ids) = line_grid(2);
        grid.set_highlight(ids[0], HighlightKind::Reachable).unwrap();
        grid.set_highlight(ids[1], HighlightKind::Path).unwrap();

        assert_eq!(grid.tile(ids[0]).unwrap().data().highlight(), HighlightKind::Reachable);

        let events = grid.drain_highlight_events();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            TileHighlightChanged {
                tile: ids[0],
                highlight: HighlightKind::Reachable
            }
        );
        assert!(grid.drain_highlight_events().is_empty());
    }
}
