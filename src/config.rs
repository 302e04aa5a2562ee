//! Export and logging configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::render::EcLevel;

/// Top-level configuration, loadable from a JSON file.
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

/// Parameters of the rendered drawing and of the exported PNG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Displayed size of the drawing in pixels.
    pub size: u32,

    /// Error-correction level requested from the encoder.
    pub error_correction: EcLevel,

    /// Whether the drawing includes the 4-module quiet zone.
    pub include_margin: bool,

    /// Surface dimension used when the drawing reports a zero displayed size.
    pub fallback_size: u32,

    /// Logo side length as a fraction of the surface width.
    pub logo_ratio: f32,

    /// Background-colored margin painted around the logo, in pixels.
    pub logo_padding: u32,

    /// Name of the downloaded file.
    pub file_name: String,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "qrlogo=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            size: 256,
            error_correction: EcLevel::High,
            include_margin: true,
            fallback_size: 256,
            logo_ratio: 0.20,
            logo_padding: 4,
            file_name: "qr-code.png".to_string(),
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

impl Config {
    /// Loads a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that would make every export fail.
    pub fn validate(&self) -> Result<()> {
        let export = &self.export;
        if export.size == 0 {
            return Err(Error::config("export.size must be positive"));
        }
        if export.fallback_size == 0 {
            return Err(Error::config("export.fallback_size must be positive"));
        }
        if !(export.logo_ratio > 0.0 && export.logo_ratio <= 1.0) {
            return Err(Error::config("export.logo_ratio must be in (0, 1]"));
        }
        if export.file_name.trim().is_empty() {
            return Err(Error::config("export.file_name must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_page() {
        let config = Config::default();
        assert_eq!(config.export.size, 256);
        assert_eq!(config.export.error_correction, EcLevel::High);
        assert!(config.export.include_margin);
        assert_eq!(config.export.file_name, "qr-code.png");
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "export": { "size": 512, "error_correction": "quartile" } }"#)
                .unwrap();
        assert_eq!(config.export.size, 512);
        assert_eq!(config.export.error_correction, EcLevel::Quartile);
        assert_eq!(config.export.logo_padding, 4);
        assert!(!config.logging.json);
    }

    #[test]
    fn test_load_rejects_bad_ratio() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qrlogo.json");
        std::fs::write(&path, r#"{ "export": { "logo_ratio": 1.5 } }"#).unwrap();
        assert!(matches!(Config::load(&path), Err(Error::Config { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Config::load("/nonexistent/qrlogo.json"),
            Err(Error::Config { .. })
        ));
    }
}
