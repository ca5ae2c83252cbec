//! The default tile variant: a flat(ish) surface a pawn walks across

use crate::errors::NavResult;
use crate::tile::{NavTile, TileData};
use bevy::prelude::*;

/// Ordinary walkable tile. All behaviour comes from the [`NavTile`] defaults.
#[derive(Debug, Clone)]
pub struct GroundTile {
    data: TileData,
}

impl GroundTile {
    pub fn new(transform: Transform, extent: Vec3) -> Self {
        Self {
            data: TileData::new(transform, extent),
        }
    }

    /// Construct with a non-default movement cost, rejecting invalid values
    pub fn with_cost(transform: Transform, extent: Vec3, cost: f32) -> NavResult<Self> {
        let mut tile = Self::new(transform, extent);
        tile.data.set_cost(cost)?;
        Ok(tile)
    }
}

impl NavTile for GroundTile {
    fn data(&self) -> &TileData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut TileData {
        &mut self.data
    }
}
