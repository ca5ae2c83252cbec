//! Pawn capabilities consumed by the pathfinder and obstruction tests

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// A way a pawn can move across a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementMode {
    Walk,
    ClimbUp,
    ClimbDown,
}

impl MovementMode {
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Small copyable set of movement modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModeSet(u8);

impl ModeSet {
    pub const EMPTY: ModeSet = ModeSet(0);
    pub const WALK: ModeSet = ModeSet(MovementMode::Walk.bit());
    pub const CLIMB: ModeSet =
        ModeSet(MovementMode::ClimbUp.bit() | MovementMode::ClimbDown.bit());

    pub fn contains(self, mode: MovementMode) -> bool {
        self.0 & mode.bit() != 0
    }

    pub fn insert(&mut self, mode: MovementMode) {
        self.0 |= mode.bit();
    }

    pub fn with(mut self, mode: MovementMode) -> Self {
        self.insert(mode);
        self
    }

    /// True if the two sets share at least one mode
    pub fn intersects(self, other: ModeSet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl From<MovementMode> for ModeSet {
    fn from(mode: MovementMode) -> Self {
        ModeSet(mode.bit())
    }
}

impl FromIterator<MovementMode> for ModeSet {
    fn from_iter<I: IntoIterator<Item = MovementMode>>(iter: I) -> Self {
        iter.into_iter().fold(ModeSet::EMPTY, ModeSet::with)
    }
}

/// Collision capsule swept along movement traces.
///
/// `offset` is the capsule's placement relative to the pawn's ground point and
/// is added to both endpoints of every trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PawnCapsule {
    pub radius: f32,
    pub half_height: f32,
    pub offset: Vec3,
}

impl Default for PawnCapsule {
    fn default() -> Self {
        Self {
            radius: 0.3,
            half_height: 0.9,
            offset: Vec3::ZERO,
        }
    }
}

/// Movement capabilities of the pawn a search is planned for.
///
/// Whose turn it is and how much budget remains are decided by the enclosing
/// session; the pathfinder only ever sees these plain parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PawnProfile {
    pub movement_modes: ModeSet,
    /// Steepest surface angle the pawn can walk on, in degrees
    pub max_walk_angle: f32,
    pub capsule: PawnCapsule,
}

impl Default for PawnProfile {
    fn default() -> Self {
        Self {
            movement_modes: ModeSet::WALK,
            max_walk_angle: 45.0,
            capsule: PawnCapsule::default(),
        }
    }
}

impl PawnProfile {
    pub fn with_modes(modes: ModeSet) -> Self {
        Self {
            movement_modes: modes,
            ..Self::default()
        }
    }
}
