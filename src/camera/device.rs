//! Camera device enumeration types.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Kind of media device reported by the host.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DeviceKind {
    VideoInput,
    AudioInput,
    AudioOutput,
}

/// Raw device entry as the host lists it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MediaDeviceInfo {
    pub device_id: String,
    pub kind: DeviceKind,
    /// Empty until the user granted camera access on some hosts.
    pub label: String,
}

/// Information about an available camera.
#[derive(Debug, Clone, Serialize, Deserialize, TS, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../types/generated/")]
pub struct VideoDevice {
    /// Identifier to pass back in a device preference.
    pub device_id: String,
    /// Human-readable device name.
    pub label: String,
}

/// Keep video inputs only, naming unlabeled ones "Camera N".
pub fn label_devices(all: Vec<MediaDeviceInfo>) -> Vec<VideoDevice> {
    all.into_iter()
        .filter(|d| d.kind == DeviceKind::VideoInput)
        .enumerate()
        .map(|(idx, d)| VideoDevice {
            label: if d.label.is_empty() {
                format!("Camera {}", idx + 1)
            } else {
                d.label
            },
            device_id: d.device_id,
        })
        .collect()
}
