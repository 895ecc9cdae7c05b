//! Capture session facade.
//!
//! Wraps the acquisition controller, reads the current frame on demand,
//! optionally keys out the green background and keeps the ordered list of
//! stills. Presentation layers (manual capture screen, kiosk sequencer) only
//! talk to this facade and to the template library.

pub mod kiosk;

pub use kiosk::{HintState, KioskAction, KioskScreen, KioskSequencer, KioskView};

use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;

use crate::camera::{
    AcquisitionController, ConstraintTier, MediaHost, RenderSink, SessionEvent, SessionHandle,
    SessionPreferences,
};
use crate::config::BoothConfig;
use crate::error::{BoothError, BoothResult};
use crate::rendering::{chroma_key_png, encode_png, png_data_url};
use crate::template::{new_id, Frame, Template};

/// One captured still. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../types/generated/")]
pub struct StillImage {
    pub id: String,
    pub width: u32,
    pub height: u32,
    /// Encoded PNG bytes.
    #[serde(skip)]
    #[ts(skip)]
    png: Vec<u8>,
    #[ts(type = "string")]
    pub captured_at: DateTime<Utc>,
    pub chroma_keyed: bool,
}

impl StillImage {
    pub fn png(&self) -> &[u8] {
        &self.png
    }

    /// `data:image/png;base64,...` URL for display.
    pub fn data_url(&self) -> String {
        png_data_url(&self.png)
    }
}

/// A template frame paired with the still it displays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotAssignment<'a> {
    pub index: usize,
    pub frame: &'a Frame,
    pub still: Option<&'a StillImage>,
}

/// Camera session plus the ordered capture list.
pub struct PhotoBooth<H: MediaHost, K: RenderSink<H::Stream>> {
    camera: AcquisitionController<H, K>,
    preferences: SessionPreferences,
    captures: Vec<StillImage>,
}

impl<H: MediaHost, K: RenderSink<H::Stream>> PhotoBooth<H, K> {
    pub fn new(host: H, sink: K) -> Self {
        Self {
            camera: AcquisitionController::new(host, sink),
            preferences: SessionPreferences::default(),
            captures: Vec::new(),
        }
    }

    pub fn from_config(host: H, sink: K, config: &BoothConfig) -> Self {
        Self {
            camera: AcquisitionController::from_config(host, sink, &config.camera),
            preferences: config.camera.session_preferences(),
            captures: Vec::new(),
        }
    }

    pub fn camera(&self) -> &AcquisitionController<H, K> {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut AcquisitionController<H, K> {
        &mut self.camera
    }

    pub fn handle(&self) -> SessionHandle {
        self.camera.handle()
    }

    pub fn is_streaming(&self) -> bool {
        self.camera.state().is_streaming()
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    /// Start with explicit preferences.
    pub async fn start_session(&mut self, prefs: SessionPreferences) -> BoothResult<ConstraintTier> {
        self.camera.start(prefs).await
    }

    /// Start with the configured preferences.
    pub async fn start_configured(&mut self) -> BoothResult<ConstraintTier> {
        let prefs = self.preferences.clone();
        self.camera.start(prefs).await
    }

    pub fn stop_session(&mut self) {
        self.camera.stop();
    }

    /// Pump the next camera event.
    pub async fn next_event(&mut self) -> Option<BoothResult<SessionEvent>> {
        self.camera.next_event().await
    }

    // ------------------------------------------------------------------
    // Captures
    // ------------------------------------------------------------------

    /// Read the current frame as a still, optionally chroma-keyed, and append
    /// it to the capture list. On any failure the list is unchanged.
    pub fn capture_still(&mut self, apply_chroma_key: bool) -> BoothResult<&StillImage> {
        if !self.is_streaming() {
            return Err(BoothError::CameraNotReady);
        }
        let frame = self.camera.current_frame().ok_or(BoothError::CameraNotReady)?;
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Err(BoothError::CameraNotReady);
        }

        let raw = encode_png(&frame)?;
        let png = if apply_chroma_key {
            match chroma_key_png(&raw) {
                Ok(png) => png,
                Err(e) => {
                    log::error!("[BOOTH] capture processing failed: {}", e);
                    return Err(e);
                }
            }
        } else {
            raw
        };

        let index = self.captures.len();
        self.captures.push(StillImage {
            id: new_id(),
            width,
            height,
            png,
            captured_at: Utc::now(),
            chroma_keyed: apply_chroma_key,
        });
        log::info!(
            "[BOOTH] Captured still {} ({}x{}{})",
            index + 1,
            width,
            height,
            if apply_chroma_key { ", chroma keyed" } else { "" }
        );
        Ok(&self.captures[index])
    }

    pub fn captures(&self) -> &[StillImage] {
        &self.captures
    }

    pub fn capture_count(&self) -> usize {
        self.captures.len()
    }

    pub fn reset_captures(&mut self) {
        log::debug!("[BOOTH] Clearing {} capture(s)", self.captures.len());
        self.captures.clear();
    }

    /// Frame `i` paired with capture `i`, for every frame of `template`.
    pub fn slot_assignments<'a>(&'a self, template: &'a Template) -> Vec<SlotAssignment<'a>> {
        template
            .frames
            .iter()
            .enumerate()
            .map(|(index, frame)| SlotAssignment {
                index,
                frame,
                still: self.captures.get(index),
            })
            .collect()
    }

    /// Snapshot of the counters the kiosk sequencer works from.
    pub fn kiosk_view(&self, template: Option<&Template>) -> KioskView {
        KioskView {
            streaming: self.is_streaming(),
            captured: self.captures.len(),
            total_frames: template.map_or(0, Template::frame_count),
        }
    }
}
