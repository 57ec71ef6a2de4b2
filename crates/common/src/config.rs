//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable overriding the asset root directory.
pub const ASSETS_ENV_VAR: &str = "FRAMEFIT_ASSETS";

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where bezel artwork and derived artifacts live.
    pub assets: AssetPaths,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Locations of the bezel library and its derived artifacts.
///
/// Everything hangs off a single root directory:
///
/// ```text
/// <root>/bezels/               bezel PNG artwork
/// <root>/masks/                one grayscale mask PNG per bezel
/// <root>/screen-regions.json   bezel filename -> screen rectangle
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetPaths {
    /// Asset root directory.
    pub root: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "framefit=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl AssetPaths {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the bezel PNG artwork.
    pub fn bezels_dir(&self) -> PathBuf {
        self.root.join("bezels")
    }

    /// Directory holding one grayscale mask PNG per bezel.
    pub fn masks_dir(&self) -> PathBuf {
        self.root.join("masks")
    }

    /// The persisted region table.
    pub fn regions_file(&self) -> PathBuf {
        self.root.join("screen-regions.json")
    }
}

impl Default for AssetPaths {
    fn default() -> Self {
        let root = std::env::var(ASSETS_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_asset_root());
        Self { root }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assets: AssetPaths::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("framefit").join("config.json")
}

/// Default asset root directory.
fn default_asset_root() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("framefit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_paths_hang_off_root() {
        let paths = AssetPaths::with_root("/opt/framefit-assets");
        assert_eq!(paths.bezels_dir(), PathBuf::from("/opt/framefit-assets/bezels"));
        assert_eq!(paths.masks_dir(), PathBuf::from("/opt/framefit-assets/masks"));
        assert_eq!(
            paths.regions_file(),
            PathBuf::from("/opt/framefit-assets/screen-regions.json")
        );
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = AppConfig {
            assets: AssetPaths::with_root("/tmp/assets"),
            logging: LoggingConfig {
                level: "debug".to_string(),
                json: true,
            },
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.assets.root, PathBuf::from("/tmp/assets"));
        assert_eq!(back.logging.level, "debug");
        assert!(back.logging.json);
    }
}
