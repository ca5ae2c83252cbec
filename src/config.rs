//! Grid settings with TOML persistence and fail-fast validation

use crate::errors::{NavGridError, NavResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use validator::Validate;

/// Tunable geometry parameters shared by every tile in a grid
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NavGridSettings {
    /// Spacing of the grid; variant tiles size their adjacency queries from it
    #[validate(range(min = 0.01, max = 100.0))]
    pub tile_size: f32,
    /// How far a tile's neighbourhood query extends past its own bounds, so
    /// adjacent tiles' bounds intersect the query shape
    #[validate(range(min = 0.0, max = 10.0))]
    pub neighbourhood_margin: f32,
    /// How far ladder anchor points sit inside the ladder's vertical extent
    #[validate(range(min = 0.0, max = 10.0))]
    pub ladder_anchor_inset: f32,
}

impl Default for NavGridSettings {
    fn default() -> Self {
        Self {
            tile_size: 1.0,
            neighbourhood_margin: 0.15,
            ladder_anchor_inset: 0.25,
        }
    }
}

impl NavGridSettings {
    pub fn from_toml_str(contents: &str) -> NavResult<Self> {
        let settings: NavGridSettings = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml_string(&self) -> NavResult<String> {
        self.validate()?;
        Ok(toml::to_string_pretty(self)?)
    }
}

pub fn get_settings_path() -> Option<PathBuf> {
    dirs::config_dir().and_then(|mut path| {
        path.push("navgrid");
        fs::create_dir_all(&path).ok()?;
        path.push("settings.toml");
        Some(path)
    })
}

/// Load settings from the user's config directory, falling back to defaults
/// when the file is missing or invalid
pub fn load_settings() -> NavGridSettings {
    if let Some(path) = get_settings_path() {
        if let Ok(contents) = fs::read_to_string(&path) {
            match NavGridSettings::from_toml_str(&contents) {
                Ok(settings) => return settings,
                Err(err) => {
                    bevy::log::warn!("ignoring invalid settings at {:?}: {err}", path);
                }
            }
        }
    }
    NavGridSettings::default()
}

pub fn save_settings(settings: &NavGridSettings) -> NavResult<()> {
    let path = get_settings_path().ok_or_else(|| NavGridError::SettingsFileNotFound {
        path: PathBuf::from("navgrid/settings.toml"),
    })?;
    fs::write(path, settings.to_toml_string()?)?;
    Ok(())
}
