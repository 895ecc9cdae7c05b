//! Kiosk sequencing configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::rendering::ExportPreset;

/// Timings and choices for unattended kiosk operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export, export_to = "../types/generated/")]
pub struct KioskConfig {
    pub countdown_seconds: u32,
    /// Idle time on the capture screen before the attract overlay returns.
    #[ts(type = "number")]
    pub capture_idle_timeout_ms: u64,
    /// Time on the final screen before starting over.
    #[ts(type = "number")]
    pub final_auto_reset_ms: u64,
    pub export_preset_id: ExportPreset,
    /// Template pinned for the kiosk; `None` uses the active one.
    #[ts(optional)]
    pub template_id: Option<String>,
    /// Key out green backgrounds on every capture.
    pub chroma_key: bool,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            countdown_seconds: 3,
            capture_idle_timeout_ms: 45_000,
            final_auto_reset_ms: 25_000,
            export_preset_id: ExportPreset::TwoR,
            template_id: None,
            chroma_key: false,
        }
    }
}

impl KioskConfig {
    pub fn capture_idle_timeout(&self) -> Duration {
        Duration::from_millis(self.capture_idle_timeout_ms)
    }

    pub fn final_auto_reset(&self) -> Duration {
        Duration::from_millis(self.final_auto_reset_ms)
    }
}
