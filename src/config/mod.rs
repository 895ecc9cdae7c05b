//! Booth configuration.
//!
//! Plain owned values, loaded once and passed to the components that need
//! them. Every field has a default, so partial JSON documents are accepted.
//!
//! - `CameraConfig`: device/resolution preferences, safe mode, poll interval
//! - `KioskConfig`: countdown, idle and auto-reset timings, export size

pub mod camera;
pub mod kiosk;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub use camera::CameraConfig;
pub use kiosk::KioskConfig;

use crate::error::{BoothError, BoothResult, ResultExt};

/// Complete booth configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export, export_to = "../types/generated/")]
pub struct BoothConfig {
    pub camera: CameraConfig,
    pub kiosk: KioskConfig,
}

impl BoothConfig {
    /// Parse a JSON document.
    pub fn from_json(json: &str) -> BoothResult<Self> {
        let config: BoothConfig = serde_json::from_str(json)
            .map_err(|e| BoothError::ConfigError(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> BoothResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_json(&content)?;
        log::info!("[CONFIG] Loaded {}", path.display());
        Ok(config)
    }

    /// Load from a JSON file, falling back to defaults when it is missing.
    pub fn load_or_default(path: impl AsRef<Path>) -> BoothResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("[CONFIG] {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn validate(&self) -> BoothResult<()> {
        if self.camera.health_poll_interval_ms == 0 {
            return Err(BoothError::ConfigError(
                "healthPollIntervalMs must be greater than 0".to_string(),
            ));
        }
        if self.camera.diagnostic_log_capacity == 0 {
            return Err(BoothError::ConfigError(
                "diagnosticLogCapacity must be greater than 0".to_string(),
            ));
        }
        if self.kiosk.countdown_seconds == 0 {
            return Err(BoothError::ConfigError(
                "countdownSeconds must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
