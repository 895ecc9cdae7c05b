//! Camera configuration.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::camera::{
    ResolutionPreference, SessionPreferences, DEFAULT_LOG_CAPACITY, HEALTH_POLL_INTERVAL_MS,
};

/// Camera negotiation and monitoring settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export, export_to = "../types/generated/")]
pub struct CameraConfig {
    /// Device to ask for first (`None` = any camera).
    #[ts(optional)]
    pub preferred_device_id: Option<String>,
    pub resolution: ResolutionPreference,
    pub ignore_device_id: bool,
    pub minimal_constraints: bool,
    /// Start from the minimal tier with one-shot recovery (unattended use).
    pub safe_mode: bool,
    #[ts(type = "number")]
    pub health_poll_interval_ms: u64,
    #[ts(type = "number")]
    pub diagnostic_log_capacity: usize,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            preferred_device_id: None,
            resolution: ResolutionPreference::High,
            ignore_device_id: false,
            minimal_constraints: false,
            safe_mode: false,
            health_poll_interval_ms: HEALTH_POLL_INTERVAL_MS,
            diagnostic_log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

impl CameraConfig {
    /// Negotiation inputs for a start request.
    pub fn session_preferences(&self) -> SessionPreferences {
        SessionPreferences {
            device_id: self.preferred_device_id.clone(),
            resolution: self.resolution,
            ignore_device_id: self.ignore_device_id,
            minimal_constraints: self.minimal_constraints,
            safe_mode: self.safe_mode,
        }
    }
}
