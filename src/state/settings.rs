/// Startup settings
///
/// Read once from `<config_dir>/png2jpg/settings.json` when the app starts.
/// The file is never written back; nothing carries over between sessions
/// unless the user edits it by hand.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::convert::jpeg::DEFAULT_QUALITY;
use crate::convert::Quality;

/// Environment variable overriding the default quality
pub const QUALITY_ENV: &str = "PNG2JPG_QUALITY";

/// User-adjustable defaults
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Initial slider position (0.0 to 1.0)
    pub default_quality: f32,

    /// Dark or light window theme
    pub dark_theme: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_quality: DEFAULT_QUALITY,
            dark_theme: true,
        }
    }
}

impl Settings {
    /// Parse from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Convert to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from the user config directory, then apply env overrides
    pub fn load() -> Self {
        let mut settings = match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        };

        if let Ok(value) = std::env::var(QUALITY_ENV) {
            settings.apply_quality_override(&value);
        }

        settings
    }

    /// Load from a specific file; missing or malformed files yield defaults
    pub fn load_from(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No settings file at {}, using defaults", path.display());
                return Self::default();
            }
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match Self::from_json(&json) {
            Ok(settings) => {
                tracing::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                tracing::warn!("Ignoring malformed settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Get the path where the settings file is looked up
    fn config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
        path.push("png2jpg");
        path.push("settings.json");
        Some(path)
    }

    fn apply_quality_override(&mut self, value: &str) {
        match value.trim().parse::<f32>() {
            Ok(quality) => self.default_quality = quality,
            Err(_) => tracing::warn!("Ignoring {}={:?}: not a number", QUALITY_ENV, value),
        }
    }

    /// Initial quality for the session
    ///
    /// Falls back to the built-in default if the configured value is unusable.
    pub fn quality(&self) -> Quality {
        Quality::new(self.default_quality).unwrap_or_else(|e| {
            tracing::warn!("{}; using default quality", e);
            Quality::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.quality(), Quality::default());
        assert!(settings.dark_theme);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{ "default_quality": 0.6 }"#).unwrap();
        assert_eq!(settings.default_quality, 0.6);
        assert!(settings.dark_theme);
    }

    #[test]
    fn test_serialization() {
        let settings = Settings {
            default_quality: 0.75,
            dark_theme: false,
        };
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_malformed_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_file_values_are_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "default_quality": 0.4, "dark_theme": false }"#).unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.quality().value(), 0.4);
        assert!(!settings.dark_theme);
    }

    #[test]
    fn test_quality_override() {
        let mut settings = Settings::default();
        settings.apply_quality_override(" 0.55 ");
        assert_eq!(settings.default_quality, 0.55);

        settings.apply_quality_override("high");
        assert_eq!(settings.default_quality, 0.55);
    }

    #[test]
    fn test_out_of_range_quality_is_clamped() {
        let settings = Settings {
            default_quality: 3.0,
            dark_theme: true,
        };
        assert_eq!(settings.quality().value(), 1.0);
    }
}
