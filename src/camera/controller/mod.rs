//! Acquisition controller.
//!
//! Owns the lifecycle of one live capture session:
//! - walks the fallback plan until the host accepts a tier
//! - binds the stream to the render sink (once per stream object)
//! - pumps track signals and the periodic health poll
//! - performs the single safe-mode recovery when a track ends
//!
//! Everything runs on one logical thread. Handlers take `&mut self`, so each
//! one runs to completion before the next event is looked at, and a second
//! negotiation cannot start while one is outstanding.

use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;
use parking_lot::RwLock;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use super::handle::StopSignal;
use super::{
    build_plan, label_devices, ConstraintTier, HostError, MediaHost, MediaStream, ReadyState,
    RenderSink, Resolution, SessionHandle, SessionPreferences, SessionState, SessionStatus,
    Severity, StreamConstraints, TrackHealth, TrackSettings, TrackSignal, VideoDevice,
    DEFAULT_LOG_CAPACITY, HEALTH_POLL_INTERVAL_MS,
};
use crate::config::CameraConfig;
use crate::error::{BoothError, BoothResult};

/// Outcome of one pumped event.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Track muted; session degraded but kept.
    Muted,
    /// Track unmuted; session live again.
    Unmuted,
    /// Periodic poll refreshed settings and readiness.
    HealthPolled {
        ready_state: ReadyState,
        resolution: Option<Resolution>,
    },
    /// Safe-mode recovery bound a new stream.
    Recovered(ConstraintTier),
    /// Stop request honoured; stream released.
    Stopped,
    /// Event arrived with no stream bound.
    Ignored,
}

/// What woke the event pump.
enum Wake {
    Stop,
    Signal(TrackSignal),
    Poll,
}

/// The bound stream plus everything watching it.
struct LiveStream<S> {
    stream: S,
    signals: flume::Receiver<TrackSignal>,
    poll: Interval,
}

/// Negotiates, binds, monitors and recovers one camera session.
pub struct AcquisitionController<H: MediaHost, K: RenderSink<H::Stream>> {
    host: H,
    sink: K,
    live: Option<LiveStream<H::Stream>>,
    /// Stream id currently attached to the sink.
    attached_stream: Option<String>,
    status: Arc<RwLock<SessionStatus>>,
    stop: Arc<StopSignal>,
    devices: Vec<VideoDevice>,
    selected_device_id: Option<String>,
    poll_interval: Duration,
    safe_mode: bool,
    /// One-shot recovery guard. Reset only by `stop` or a new start.
    recovery_used: bool,
    playing: bool,
}

impl<H: MediaHost, K: RenderSink<H::Stream>> AcquisitionController<H, K> {
    pub fn new(host: H, sink: K) -> Self {
        Self {
            host,
            sink,
            live: None,
            attached_stream: None,
            status: Arc::new(RwLock::new(SessionStatus::with_log_capacity(
                DEFAULT_LOG_CAPACITY,
            ))),
            stop: Arc::new(StopSignal::default()),
            devices: Vec::new(),
            selected_device_id: None,
            poll_interval: Duration::from_millis(HEALTH_POLL_INTERVAL_MS),
            safe_mode: false,
            recovery_used: false,
            playing: false,
        }
    }

    /// Build a controller using poll interval, log size and device selection
    /// from the camera config.
    pub fn from_config(host: H, sink: K, config: &CameraConfig) -> Self {
        let mut controller = Self::new(host, sink)
            .with_poll_interval(Duration::from_millis(config.health_poll_interval_ms))
            .with_log_capacity(config.diagnostic_log_capacity);
        controller.selected_device_id = config.preferred_device_id.clone();
        controller
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn with_log_capacity(self, capacity: usize) -> Self {
        *self.status.write() = SessionStatus::with_log_capacity(capacity);
        self
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    /// Read-only view for presentation layers.
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            status: Arc::clone(&self.status),
            stop: Arc::clone(&self.stop),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status.read().clone()
    }

    pub fn state(&self) -> SessionState {
        self.status.read().state
    }

    pub fn active_tier(&self) -> Option<ConstraintTier> {
        self.status.read().active_tier
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn devices(&self) -> &[VideoDevice] {
        &self.devices
    }

    pub fn selected_device_id(&self) -> Option<&str> {
        self.selected_device_id.as_deref()
    }

    pub fn select_device(&mut self, device_id: Option<String>) {
        log::debug!("[ACQUISITION] select_device({:?})", device_id);
        self.selected_device_id = device_id;
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Frame currently shown by the render sink, only while a stream is bound.
    pub fn current_frame(&self) -> Option<RgbaImage> {
        self.live.as_ref()?;
        self.sink.snapshot()
    }

    // ------------------------------------------------------------------
    // Start / stop
    // ------------------------------------------------------------------

    /// Negotiate a stream through the fallback plan and bind it.
    ///
    /// Returns the tier that succeeded. A `PlaybackFailed` error leaves the
    /// stream bound and live; call [`retry_playback`](Self::retry_playback).
    pub async fn start(&mut self, mut prefs: SessionPreferences) -> BoothResult<ConstraintTier> {
        if self.state() == SessionState::Negotiating {
            log::warn!("[ACQUISITION] Previous negotiation was abandoned mid-flight");
        }
        if prefs.device_id.is_none() {
            prefs.device_id = self.selected_device_id.clone();
        }

        self.log(
            Severity::Info,
            format!(
                "start flags: safe={}, simple={}, resolution={:?}, ignoreDeviceId={}, selected={}",
                prefs.safe_mode,
                prefs.minimal_constraints,
                prefs.resolution,
                prefs.ignore_device_id,
                prefs.device_id.as_deref().unwrap_or("none")
            ),
        );

        self.release_stream();
        self.stop.reset();
        self.safe_mode = prefs.safe_mode;
        self.recovery_used = false;
        {
            let mut status = self.status.write();
            status.state = SessionState::Negotiating;
            status.last_message = None;
        }

        let mut attempted = Vec::new();
        let mut last_error = String::from("no tier attempted");

        for attempt in build_plan(&prefs) {
            self.log(Severity::Info, format!("attempt {}", attempt.tier));
            attempted.push(attempt.tier);

            match self.host.request_stream(&attempt.constraints).await {
                Ok(stream) => {
                    if self.stop.is_requested() {
                        return Err(self.abandon_negotiation(Some(stream)));
                    }
                    self.log(Severity::Info, format!("success via {}", attempt.tier));
                    self.bind(stream, attempt.tier).await?;
                    return Ok(attempt.tier);
                }
                Err(e) => {
                    self.log(Severity::Warn, format!("{} failed: {}", attempt.tier, e));
                    last_error = e.to_string();
                    if self.stop.is_requested() {
                        return Err(self.abandon_negotiation(None));
                    }
                }
            }
        }

        self.log(
            Severity::Error,
            format!(
                "negotiation exhausted after {} tier(s): {}",
                attempted.len(),
                last_error
            ),
        );
        {
            let mut status = self.status.write();
            status.state = SessionState::Idle;
            status.last_message = Some(last_error.clone());
        }
        Err(BoothError::NegotiationExhausted {
            attempted,
            last_error,
        })
    }

    /// Start directly from the minimal tier with recovery armed.
    pub async fn start_safe(&mut self) -> BoothResult<ConstraintTier> {
        self.start(SessionPreferences::safe()).await
    }

    /// Release the session. Idempotent.
    pub fn stop(&mut self) {
        let released = self.release_stream();
        self.safe_mode = false;
        self.recovery_used = false;
        self.stop.reset();

        let previous = {
            let mut status = self.status.write();
            let previous = status.state;
            status.state = SessionState::Stopped;
            status.last_message = None;
            previous
        };
        if released || previous != SessionState::Stopped {
            self.log(Severity::Info, "stop called; stream cleaned");
        }
    }

    /// Run a one-off unconstrained request, report its settings and release it.
    pub async fn probe(&mut self) -> BoothResult<TrackSettings> {
        self.log(Severity::Info, "basic test start (video:true)");
        match self.host.request_stream(&StreamConstraints::minimal()).await {
            Ok(stream) => {
                let settings = stream.settings();
                self.log(
                    Severity::Info,
                    format!(
                        "basic test success w={} h={} fps={} state={:?}",
                        fmt_opt(settings.width),
                        fmt_opt(settings.height),
                        fmt_opt(settings.frame_rate),
                        stream.ready_state()
                    ),
                );
                stream.stop();
                Ok(settings)
            }
            Err(e) => {
                self.log(Severity::Error, format!("basic test error: {}", e));
                Err(BoothError::NegotiationExhausted {
                    attempted: vec![ConstraintTier::Minimal],
                    last_error: e.to_string(),
                })
            }
        }
    }

    // ------------------------------------------------------------------
    // Devices
    // ------------------------------------------------------------------

    /// List video inputs. Failures are logged and yield an empty list.
    /// Seeds the selected device with the first one if none was chosen.
    pub async fn refresh_devices(&mut self) -> Vec<VideoDevice> {
        match self.host.enumerate_devices().await {
            Ok(all) => {
                let devices = label_devices(all);
                if self.selected_device_id.is_none() {
                    if let Some(first) = devices.first() {
                        log::debug!("[ACQUISITION] Seeding device selection: {}", first.label);
                        self.selected_device_id = Some(first.device_id.clone());
                    }
                }
                self.devices = devices.clone();
                devices
            }
            Err(e) => {
                let err = BoothError::EnumerationFailed(e.to_string());
                self.log(Severity::Warn, err.to_string());
                self.devices.clear();
                Vec::new()
            }
        }
    }

    // ------------------------------------------------------------------
    // Binding
    // ------------------------------------------------------------------

    /// Attach the live stream to the render sink. Returns false when there is
    /// no stream or this stream object is already attached.
    pub fn attach_render_sink(&mut self) -> bool {
        let Some(live) = &self.live else {
            return false;
        };
        let id = live.stream.id();
        if self.attached_stream.as_deref() == Some(id) {
            log::debug!("[ACQUISITION] Stream {} already attached", id);
            return false;
        }
        if self.attached_stream.is_some() {
            self.sink.detach();
        }
        self.sink.attach(&live.stream);
        self.attached_stream = Some(id.to_string());
        true
    }

    /// Retry sink playback of the bound stream.
    pub async fn retry_playback(&mut self) -> BoothResult<()> {
        if self.live.is_none() {
            return Err(BoothError::CameraNotReady);
        }
        self.attach_render_sink();
        self.start_playback().await
    }

    async fn bind(&mut self, stream: H::Stream, tier: ConstraintTier) -> BoothResult<()> {
        let signals = stream.signals();
        let settings = track_settings(&stream);
        let health = TrackHealth {
            label: track_label(&stream, "Unknown camera"),
            ready_state: stream.ready_state(),
        };
        {
            let mut status = self.status.write();
            status.state = SessionState::Live;
            status.active_tier = Some(tier);
            status.track_health = Some(health);
            status.resolution = settings.resolution();
            status.settings = Some(settings);
            status.last_message = None;
        }

        let mut poll = interval_at(Instant::now() + self.poll_interval, self.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.live = Some(LiveStream {
            stream,
            signals,
            poll,
        });

        self.attach_render_sink();
        self.start_playback().await
    }

    async fn start_playback(&mut self) -> BoothResult<()> {
        match self.sink.play().await {
            Ok(()) => {
                self.playing = true;
                let (settings, ready) = match &self.live {
                    Some(live) => (track_settings(&live.stream), live.stream.ready_state()),
                    None => return Err(BoothError::CameraNotReady),
                };
                let resolution = settings.resolution().or_else(|| self.sink.playback_size());
                {
                    let mut status = self.status.write();
                    status.resolution = resolution;
                    let merged = settings.clone().merged_over(status.settings.as_ref());
                    status.settings = Some(merged);
                }
                self.log(
                    Severity::Info,
                    format!(
                        "video playing w={} h={} fps={} track={:?}",
                        fmt_opt(resolution.map(|r| r.width)),
                        fmt_opt(resolution.map(|r| r.height)),
                        fmt_opt(settings.frame_rate),
                        ready
                    ),
                );
                self.refresh_devices().await;
                Ok(())
            }
            Err(e) => {
                self.playing = false;
                let message = e.to_string();
                self.log(Severity::Error, format!("video play failed: {}", message));
                self.status.write().last_message = Some(message.clone());
                Err(BoothError::PlaybackFailed(message))
            }
        }
    }

    /// Stop tracks, detach the sink and clear derived status.
    fn release_stream(&mut self) -> bool {
        let released = match self.live.take() {
            Some(live) => {
                live.stream.stop();
                true
            }
            None => false,
        };
        if self.attached_stream.take().is_some() {
            self.sink.detach();
        }
        self.playing = false;
        self.status.write().clear_derived();
        released
    }

    fn abandon_negotiation(&mut self, stream: Option<H::Stream>) -> BoothError {
        if let Some(stream) = stream {
            stream.stop();
        }
        self.log(
            Severity::Warn,
            "stop requested during negotiation; stream released",
        );
        self.stop.reset();
        self.status.write().state = SessionState::Stopped;
        BoothError::NegotiationCancelled
    }

    // ------------------------------------------------------------------
    // Monitoring
    // ------------------------------------------------------------------

    /// Wait for the next track signal, health poll or stop request and handle it.
    ///
    /// Returns `None` when no stream is bound. Session loss is returned as
    /// `Err(SessionLost)`.
    pub async fn next_event(&mut self) -> Option<BoothResult<SessionEvent>> {
        loop {
            if self.stop.is_requested() && self.live.is_some() {
                self.stop();
                return Some(Ok(SessionEvent::Stopped));
            }

            let stop = Arc::clone(&self.stop);
            let live = self.live.as_mut()?;
            let signals = live.signals.clone();

            let wake = tokio::select! {
                biased;
                _ = stop.wait() => Wake::Stop,
                signal = signals.recv_async() => {
                    // A dropped signal source means the track is gone.
                    Wake::Signal(signal.unwrap_or(TrackSignal::Ended))
                }
                _ = live.poll.tick() => Wake::Poll,
            };

            match wake {
                Wake::Stop => continue,
                Wake::Signal(signal) => return Some(self.handle_signal(signal).await),
                Wake::Poll => return Some(self.poll_health().await),
            }
        }
    }

    /// Apply one track signal to the session.
    pub async fn handle_signal(&mut self, signal: TrackSignal) -> BoothResult<SessionEvent> {
        if self.live.is_none() {
            log::debug!("[ACQUISITION] Ignoring {:?} with no stream bound", signal);
            return Ok(SessionEvent::Ignored);
        }

        match signal {
            TrackSignal::Muted => {
                {
                    let mut status = self.status.write();
                    status.state = SessionState::Degraded;
                    if let Some(health) = status.track_health.as_mut() {
                        health.ready_state = ReadyState::Muted;
                    }
                    status.last_message = Some("Camera muted".to_string());
                }
                self.log(Severity::Warn, "track muted");
                Ok(SessionEvent::Muted)
            }
            TrackSignal::Unmuted => {
                {
                    let mut status = self.status.write();
                    status.state = SessionState::Live;
                    if let Some(health) = status.track_health.as_mut() {
                        health.ready_state = ReadyState::Live;
                    }
                    status.last_message = None;
                }
                self.log(Severity::Info, "track unmuted");
                Ok(SessionEvent::Unmuted)
            }
            TrackSignal::Ended => self.handle_track_ended().await,
        }
    }

    /// Re-read track settings and readiness.
    pub async fn poll_health(&mut self) -> BoothResult<SessionEvent> {
        let Some(live) = &self.live else {
            return Ok(SessionEvent::Ignored);
        };

        let ready_state = live.stream.ready_state();
        if ready_state == ReadyState::Ended && !self.stop.is_requested() {
            self.log(Severity::Warn, "health poll found ended track");
            return self.handle_track_ended().await;
        }

        let settings = track_settings(&live.stream);
        let label = track_label(&live.stream, "Camera");
        let resolution = settings.resolution().or_else(|| self.sink.playback_size());

        let mut status = self.status.write();
        status.track_health = Some(TrackHealth { label, ready_state });
        let merged = settings.merged_over(status.settings.as_ref());
        status.settings = Some(merged);
        if resolution.is_some() {
            status.resolution = resolution;
        }
        status.state = match ready_state {
            ReadyState::Muted => SessionState::Degraded,
            _ => SessionState::Live,
        };

        Ok(SessionEvent::HealthPolled {
            ready_state,
            resolution,
        })
    }

    async fn handle_track_ended(&mut self) -> BoothResult<SessionEvent> {
        if self.safe_mode && !self.recovery_used {
            self.recovery_used = true;
            self.log(Severity::Warn, "track ended; retrying safe low (320x240@15)");
            self.release_stream();
            self.status.write().state = SessionState::Negotiating;

            let tier = ConstraintTier::SafeRecovery;
            self.log(Severity::Info, format!("attempt {}", tier));
            return match self.host.request_stream(&tier.constraints(None)).await {
                Ok(stream) => {
                    if self.stop.is_requested() {
                        return Err(self.abandon_negotiation(Some(stream)));
                    }
                    self.log(Severity::Info, format!("success via {}", tier));
                    self.bind(stream, tier).await?;
                    Ok(SessionEvent::Recovered(tier))
                }
                Err(e) => Err(self.lose_session(format!("safe low retry failed: {}", e))),
            };
        }

        self.release_stream();
        let reason = if self.recovery_used {
            "track ended after safe-mode recovery"
        } else {
            "track ended"
        };
        Err(self.lose_session(reason.to_string()))
    }

    fn lose_session(&mut self, reason: String) -> BoothError {
        self.log(Severity::Warn, reason.clone());
        {
            let mut status = self.status.write();
            status.state = SessionState::Stopped;
            status.last_message = Some("Camera stopped".to_string());
        }
        BoothError::SessionLost { reason }
    }

    fn log(&self, level: Severity, message: impl Into<String>) {
        self.status.write().diagnostics.push(level, message);
    }
}

impl<H: MediaHost, K: RenderSink<H::Stream>> Drop for AcquisitionController<H, K> {
    fn drop(&mut self) {
        if let Some(live) = self.live.take() {
            live.stream.stop();
        }
    }
}

fn track_settings<S: MediaStream>(stream: &S) -> TrackSettings {
    let mut settings = stream.settings();
    if settings.device_label.is_none() {
        let label = stream.label();
        if !label.is_empty() {
            settings.device_label = Some(label);
        }
    }
    settings
}

fn track_label<S: MediaStream>(stream: &S, fallback: &str) -> String {
    let label = stream.label();
    if label.is_empty() {
        fallback.to_string()
    } else {
        label
    }
}

fn fmt_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}
