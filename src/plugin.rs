//! Bevy integration: keeps a [`NavGrid`] resource fresh each frame

use crate::grid::{NavGrid, TileHighlightChanged};
use bevy::prelude::*;

/// Runs neighbour discovery for pending geometry changes and republishes
/// highlight changes as Bevy events. The grid resource is optional so the
/// plugin can be installed before any map is loaded.
pub struct NavGridPlugin;

impl Plugin for NavGridPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<TileHighlightChanged>().add_systems(
            Update,
            (flush_grid_geometry, emit_highlight_events).chain(),
        );
    }
}

fn flush_grid_geometry(grid: Option<ResMut<NavGrid>>) {
    if let Some(mut grid) = grid {
        if grid.has_pending_geometry_changes() {
            grid.flush_geometry_changes();
        }
    }
}

fn emit_highlight_events(
    grid: Option<ResMut<NavGrid>>,
    mut events: EventWriter<TileHighlightChanged>,
) {
    if let Some(mut grid) = grid {
        for event in grid.drain_highlight_events() {
            events.write(event);
        }
    }
}
