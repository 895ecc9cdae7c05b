//! Camera session acquisition.
//!
//! Negotiates a working capture configuration against the host through an
//! ordered fallback plan, binds the stream to a render sink, monitors the
//! live track and recovers once in safe mode.
//!
//! The host side (camera API, video element) is abstracted by the traits in
//! [`host`], so the whole controller runs against scripted fakes in tests.

mod constraints;
mod controller;
mod device;
mod diagnostics;
mod handle;
mod host;

#[cfg(test)]
pub(crate) mod testing;

pub use constraints::{build_plan, ConstraintTier, DimensionRange, StreamConstraints, TierAttempt};
pub use controller::{AcquisitionController, SessionEvent};
pub use device::{label_devices, DeviceKind, MediaDeviceInfo, VideoDevice};
pub use diagnostics::{DiagnosticEntry, DiagnosticLog, Severity, DEFAULT_LOG_CAPACITY};
pub use handle::{SessionHandle, SessionStatus};
pub use host::{HostError, MediaHost, MediaStream, RenderSink, TrackSignal};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Interval between health polls of a live track.
pub const HEALTH_POLL_INTERVAL_MS: u64 = 2000;

/// Lifecycle state of the capture session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../types/generated/")]
pub enum SessionState {
    /// No stream, nothing requested (also after exhausted negotiation).
    #[default]
    Idle,
    /// Fallback tiers are being tried.
    Negotiating,
    /// Stream bound and delivering frames.
    Live,
    /// Stream bound but the track reported muted.
    Degraded,
    /// Session ended by stop or by loss of the track.
    Stopped,
}

impl SessionState {
    /// Whether a stream is currently bound.
    pub fn is_streaming(&self) -> bool {
        matches!(self, SessionState::Live | SessionState::Degraded)
    }
}

/// Requested capture resolution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../types/generated/")]
pub enum ResolutionPreference {
    /// ~1280x720.
    #[default]
    High,
    /// ~640x480.
    Low,
}

/// Track readiness as reported by the host.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../types/generated/")]
pub enum ReadyState {
    Live,
    Muted,
    Ended,
}

/// Label and readiness of the bound video track.
#[derive(Debug, Clone, Serialize, Deserialize, TS, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../types/generated/")]
pub struct TrackHealth {
    pub label: String,
    pub ready_state: ReadyState,
}

/// Pixel dimensions of the live video.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../types/generated/")]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Settings the host reports for a track. Any field may be unknown.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../types/generated/")]
pub struct TrackSettings {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub frame_rate: Option<f64>,
    pub device_label: Option<String>,
}

impl TrackSettings {
    /// Resolution from the settings, if both dimensions are known and non-zero.
    pub fn resolution(&self) -> Option<Resolution> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some(Resolution::new(w, h)),
            _ => None,
        }
    }

    /// Merge fresh settings over previous ones, keeping known values the host
    /// stopped reporting.
    pub fn merged_over(self, previous: Option<&TrackSettings>) -> TrackSettings {
        match previous {
            None => self,
            Some(prev) => TrackSettings {
                width: self.width.or(prev.width),
                height: self.height.or(prev.height),
                frame_rate: self.frame_rate.or(prev.frame_rate),
                device_label: self.device_label.or_else(|| prev.device_label.clone()),
            },
        }
    }
}

/// Inputs to one negotiation request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionPreferences {
    /// Specific device to ask for; `None` means any camera.
    pub device_id: Option<String>,
    pub resolution: ResolutionPreference,
    /// Never pass a device identifier to the host.
    pub ignore_device_id: bool,
    /// Ask for an unconstrained stream only.
    pub minimal_constraints: bool,
    /// Start at the minimal tier and arm the one-shot ended-track recovery.
    pub safe_mode: bool,
}

impl SessionPreferences {
    /// Preferences used for unattended operation.
    pub fn safe() -> Self {
        Self {
            safe_mode: true,
            ..Self::default()
        }
    }
}
