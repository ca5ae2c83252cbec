pub mod collision;
pub mod config;
pub mod errors;
pub mod grid;
pub mod path;
pub mod pathfinding;
pub mod pawn;
pub mod plugin;
pub mod tile;

// Selective re-exports for external consumers

// Errors - callers match on these and thread results through their own
pub use errors::{NavGridError, NavResult};

// Core graph types and the Bevy integration
pub use grid::{NavGrid, TileHighlightChanged, TileId};
pub use plugin::NavGridPlugin;

// Everything a caller needs to plan a move and drive a pawn along it
pub use config::NavGridSettings;
pub use path::{build_path, NavPath, PathSegment};
pub use crate::pathfinding::{plan_moves, PathField};
pub use pawn::{ModeSet, MovementMode, PawnCapsule, PawnProfile};
pub use tile::{GroundTile, HighlightKind, LadderTile, NavTile, TileData};

// Collision seam - bring your own physics or use the built-in obstacle set
pub use collision::{CollisionQuery, NoObstructions, ObstacleWorld};
