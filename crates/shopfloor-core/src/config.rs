//! Session configuration: grid size, world scale and where saves go.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// On-disk encoding of save files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// Compact bincode
    Binary,
}

/// Configuration for a building session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Grid width in cells (x axis)
    pub grid_width: i32,
    /// Grid length in cells (z axis)
    pub grid_length: i32,
    /// World units per cell
    pub cell_size: f32,
    /// Save file location
    pub save_file: PathBuf,
    pub save_format: SaveFormat,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            grid_width: 10,
            grid_length: 10,
            cell_size: 1.0,
            save_file: PathBuf::from("MultiGridSave.json"),
            save_format: SaveFormat::Json,
        }
    }
}

impl BuildConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: BuildConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width <= 0 || self.grid_length <= 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must have positive dimensions, got {}x{}",
                self.grid_width, self.grid_length
            )));
        }
        if !(self.cell_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "cell_size must be positive, got {}",
                self.cell_size
            )));
        }
        Ok(())
    }
}

/// Errors loading configuration or catalog files
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Json(e) => write!(f, "JSON error: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BuildConfig::default();
        assert_eq!(config.grid_width, 10);
        assert_eq!(config.grid_length, 10);
        assert_eq!(config.save_format, SaveFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = BuildConfig::from_json_str(r#"{ "grid_width": 24, "save_format": "binary" }"#)
            .unwrap();
        assert_eq!(config.grid_width, 24);
        assert_eq!(config.grid_length, 10);
        assert_eq!(config.save_format, SaveFormat::Binary);
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        let err = BuildConfig::from_json_str(r#"{ "grid_length": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = BuildConfig::from_json_str(r#"{ "cell_size": -1.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            BuildConfig::from_json_str("{ grid_width"),
            Err(ConfigError::Json(_))
        ));
    }
}
