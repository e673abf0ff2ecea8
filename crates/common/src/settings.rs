//! # Placement Settings
//!
//! Persistent settings for the placement controller.
//!
//! - **Location**: `~/.gridplace/settings.json`
//! - **Format**: JSON with pretty formatting
//! - **Default Fallback**: If loading fails or no file exists, default
//!   settings are used
//! - **Auto-creation**: The directory is created automatically on save
//!
//! Settings are loaded once by the controller plugin; mutate them via
//! `ResMut<PlacementSettings>` and they save automatically when
//! `auto_save` is enabled.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::PlacementError;
use crate::surfaces::SurfaceType;

/// Global placement settings resource.
#[derive(Resource, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PlacementSettings {
    /// Grid cell size in world units, applied to the two horizontal axes.
    pub grid_cell_size: f32,

    /// Surface types the controller accepts hits on.
    pub allowed_surface_types: HashSet<SurfaceType>,

    /// Duration of the entry/exit scale animation, in seconds.
    pub scale_animation_duration: f32,

    /// Save automatically whenever the resource is mutated.
    pub auto_save: bool,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            grid_cell_size: 0.05,
            allowed_surface_types: SurfaceType::all(),
            scale_animation_duration: 1.0,
            auto_save: false,
        }
    }
}

impl PlacementSettings {
    /// Get the settings file path (`~/.gridplace/settings.json`).
    pub fn settings_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".gridplace").join("settings.json"))
    }

    /// Load settings from the default path or create defaults.
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("could not determine home directory, using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from an explicit path, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("no settings file at {:?}, using defaults", path);
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Self>(&content) {
                Ok(settings) => {
                    info!("loaded placement settings from {:?}", path);
                    settings
                }
                Err(err) => {
                    warn!("failed to parse settings file: {err}, using defaults");
                    Self::default()
                }
            },
            Err(err) => {
                warn!("failed to read settings file: {err}, using defaults");
                Self::default()
            }
        }
    }

    /// Save settings to the default path.
    pub fn save(&self) -> Result<(), PlacementError> {
        let path = Self::settings_path().ok_or(PlacementError::NoHomeDirectory)?;
        self.save_to(&path)
    }

    /// Save settings to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), PlacementError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!("saved placement settings to {:?}", path);
        Ok(())
    }
}
