//! Read-only session view for presentation layers.
//!
//! The controller owns and mutates [`SessionStatus`]; consumers hold a
//! [`SessionHandle`] that can read a snapshot at any time (also while a
//! negotiation is suspended) and request a stop, but never mutate status.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::Notify;

use super::{
    ConstraintTier, DiagnosticEntry, DiagnosticLog, Resolution, SessionState, TrackHealth,
    TrackSettings,
};

/// Everything a consumer may display about the session.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub state: SessionState,
    pub active_tier: Option<ConstraintTier>,
    pub track_health: Option<TrackHealth>,
    pub settings: Option<TrackSettings>,
    pub resolution: Option<Resolution>,
    /// Short status line ("Camera muted", "Camera stopped", last error).
    pub last_message: Option<String>,
    #[serde(rename = "logs")]
    pub diagnostics: DiagnosticLog,
}

impl SessionStatus {
    pub(crate) fn with_log_capacity(capacity: usize) -> Self {
        Self {
            diagnostics: DiagnosticLog::new(capacity),
            ..Self::default()
        }
    }

    /// Reset everything derived from a bound stream.
    pub(crate) fn clear_derived(&mut self) {
        self.active_tier = None;
        self.track_health = None;
        self.settings = None;
        self.resolution = None;
    }
}

impl Serialize for DiagnosticLog {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.entries())
    }
}

/// Stop request shared between the controller and its handles.
#[derive(Debug, Default)]
pub(crate) struct StopSignal {
    requested: AtomicBool,
    notify: Notify,
}

impl StopSignal {
    pub(crate) fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    pub(crate) fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    pub(crate) fn reset(&self) {
        self.requested.store(false, Ordering::SeqCst);
    }

    pub(crate) async fn wait(&self) {
        self.notify.notified().await;
    }
}

/// Cloneable read-only view of a controller's session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub(crate) status: Arc<RwLock<SessionStatus>>,
    pub(crate) stop: Arc<StopSignal>,
}

impl SessionHandle {
    /// Snapshot of the current status.
    pub fn status(&self) -> SessionStatus {
        self.status.read().clone()
    }

    pub fn state(&self) -> SessionState {
        self.status.read().state
    }

    pub fn is_streaming(&self) -> bool {
        self.status.read().state.is_streaming()
    }

    pub fn resolution(&self) -> Option<Resolution> {
        self.status.read().resolution
    }

    pub fn track_health(&self) -> Option<TrackHealth> {
        self.status.read().track_health.clone()
    }

    /// Diagnostic entries, oldest first.
    pub fn logs(&self) -> Vec<DiagnosticEntry> {
        self.status.read().diagnostics.entries()
    }

    /// Ask the controller to stop. Honoured mid-negotiation: a stream produced
    /// after the request is released instead of bound.
    pub fn request_stop(&self) {
        self.stop.request();
    }
}
