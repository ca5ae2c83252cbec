use crate::grid::TileId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NavGridError {
    // Tile configuration errors
    #[error("tile cost must be a positive finite number, got {cost}")]
    NonPositiveCost { cost: f32 },

    #[error("no tile with id {0} exists in this grid")]
    UnknownTile(TileId),

    // Pathfinding errors
    #[error("tile {0} is not reachable from the search start within the cost budget")]
    Unreachable(TileId),

    // Settings errors
    #[error("failed to read or write settings file: {0}")]
    SettingsIo(#[from] std::io::Error),

    #[error("failed to serialize settings: {0}")]
    SettingsSerialization(#[from] toml::ser::Error),

    #[error("failed to deserialize settings: {0}")]
    SettingsDeserialization(#[from] toml::de::Error),

    #[error("invalid settings: {0}")]
    InvalidSettings(#[from] validator::ValidationErrors),

    #[error("settings file not found at path: {path}")]
    SettingsFileNotFound { path: PathBuf },
}

/// Result type alias for all operations
pub type NavResult<T> = Result<T, NavGridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navgrid_error_display() {
        let err = NavGridError::NonPositiveCost { cost: -2.0 };
        assert!(err.to_string().contains("positive"));

        let err = NavGridError::Unreachable(TileId::from_index(3));
        assert!(err.to_string().contains("not reachable"));
    }
}
