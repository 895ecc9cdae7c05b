//! Host capabilities consumed by the acquisition controller.
//!
//! A host provides streams (`request_stream`), device listings and a render
//! sink that shows the stream and can hand back the frame on screen.

use image::RgbaImage;
use thiserror::Error;

use super::{MediaDeviceInfo, ReadyState, Resolution, StreamConstraints, TrackSettings};

/// Failure reported by the host when a request is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Requested device does not exist or is unplugged.
    #[error("device not found: {0}")]
    NotFound(String),

    /// User or policy denied camera access.
    #[error("permission denied: {0}")]
    NotAllowed(String),

    /// No device can satisfy the constraints.
    #[error("constraints cannot be satisfied: {0}")]
    Overconstrained(String),

    /// Device exists but cannot be opened (busy, driver error).
    #[error("device not readable: {0}")]
    NotReadable(String),

    /// Render sink refused to start playback.
    #[error("playback rejected: {0}")]
    Playback(String),

    #[error("{0}")]
    Other(String),
}

/// Lifecycle signals raised by a video track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackSignal {
    Ended,
    Muted,
    Unmuted,
}

/// Host media-capture capability.
#[allow(async_fn_in_trait)]
pub trait MediaHost {
    type Stream: MediaStream;

    /// Ask the host for a stream matching `constraints`.
    async fn request_stream(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Self::Stream, HostError>;

    /// List every media device the host knows about.
    async fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, HostError>;
}

/// A live stream with a single video track.
pub trait MediaStream {
    /// Identity of this stream object.
    fn id(&self) -> &str;

    /// Human-readable label of the video track.
    fn label(&self) -> String;

    /// Current readiness of the video track.
    fn ready_state(&self) -> ReadyState;

    /// Current settings of the video track.
    fn settings(&self) -> TrackSettings;

    /// Channel delivering ended/muted/unmuted signals for the video track.
    fn signals(&self) -> flume::Receiver<TrackSignal>;

    /// Stop every track of the stream.
    fn stop(&self);
}

/// Consumer-provided surface the live stream is shown on.
#[allow(async_fn_in_trait)]
pub trait RenderSink<S: MediaStream> {
    fn attach(&mut self, stream: &S);

    fn detach(&mut self);

    /// Begin playback of the attached stream.
    async fn play(&mut self) -> Result<(), HostError>;

    /// Observed playback size once frames arrive.
    fn playback_size(&self) -> Option<Resolution>;

    /// Frame currently displayed, if any.
    fn snapshot(&self) -> Option<RgbaImage>;
}
