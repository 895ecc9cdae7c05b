//! Scripted host, stream and sink used by the camera and booth tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use image::{Rgba, RgbaImage};

use super::{
    DeviceKind, HostError, MediaDeviceInfo, MediaHost, MediaStream, ReadyState, RenderSink,
    Resolution, StreamConstraints, TrackSettings, TrackSignal,
};

// ============================================================================
// Stream
// ============================================================================

pub(crate) struct FakeStream {
    id: String,
    label: String,
    settings: TrackSettings,
    ready: Rc<Cell<ReadyState>>,
    signals: flume::Receiver<TrackSignal>,
    stopped: Rc<Cell<bool>>,
}

/// Test-side control over a [`FakeStream`].
#[derive(Clone)]
pub(crate) struct TrackControl {
    sender: flume::Sender<TrackSignal>,
    ready: Rc<Cell<ReadyState>>,
    stopped: Rc<Cell<bool>>,
}

impl TrackControl {
    /// Raise a signal and move the ready state along with it.
    pub(crate) fn fire(&self, signal: TrackSignal) {
        self.ready.set(match signal {
            TrackSignal::Ended => ReadyState::Ended,
            TrackSignal::Muted => ReadyState::Muted,
            TrackSignal::Unmuted => ReadyState::Live,
        });
        let _ = self.sender.send(signal);
    }

    /// Change readiness without raising a signal.
    pub(crate) fn set_ready(&self, state: ReadyState) {
        self.ready.set(state);
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped.get()
    }
}

pub(crate) fn fake_stream(id: &str, width: u32, height: u32) -> (FakeStream, TrackControl) {
    let settings = TrackSettings {
        width: Some(width),
        height: Some(height),
        frame_rate: Some(30.0),
        device_label: None,
    };
    fake_stream_with(id, "Test Camera", settings)
}

pub(crate) fn fake_stream_with(
    id: &str,
    label: &str,
    settings: TrackSettings,
) -> (FakeStream, TrackControl) {
    let (sender, signals) = flume::unbounded();
    let ready = Rc::new(Cell::new(ReadyState::Live));
    let stopped = Rc::new(Cell::new(false));
    let stream = FakeStream {
        id: id.to_string(),
        label: label.to_string(),
        settings,
        ready: Rc::clone(&ready),
        signals,
        stopped: Rc::clone(&stopped),
    };
    (
        stream,
        TrackControl {
            sender,
            ready,
            stopped,
        },
    )
}

impl MediaStream for FakeStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.label.clone()
    }

    fn ready_state(&self) -> ReadyState {
        self.ready.get()
    }

    fn settings(&self) -> TrackSettings {
        self.settings.clone()
    }

    fn signals(&self) -> flume::Receiver<TrackSignal> {
        self.signals.clone()
    }

    fn stop(&self) {
        self.stopped.set(true);
        self.ready.set(ReadyState::Ended);
    }
}

// ============================================================================
// Host
// ============================================================================

type StopHook = Box<dyn Fn()>;

#[derive(Default)]
struct HostState {
    responses: RefCell<VecDeque<Result<FakeStream, HostError>>>,
    requests: RefCell<Vec<StreamConstraints>>,
    devices: RefCell<Option<Result<Vec<MediaDeviceInfo>, HostError>>>,
    /// Runs inside `request_stream`, before the response is returned.
    on_request: RefCell<Option<StopHook>>,
}

/// Host answering requests from a script. Clones share the script.
#[derive(Clone, Default)]
pub(crate) struct FakeHost {
    state: Rc<HostState>,
}

impl FakeHost {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_stream(&self, stream: FakeStream) {
        self.state.responses.borrow_mut().push_back(Ok(stream));
    }

    pub(crate) fn push_error(&self, error: HostError) {
        self.state.responses.borrow_mut().push_back(Err(error));
    }

    pub(crate) fn set_devices(&self, devices: Result<Vec<MediaDeviceInfo>, HostError>) {
        *self.state.devices.borrow_mut() = Some(devices);
    }

    pub(crate) fn on_request(&self, hook: impl Fn() + 'static) {
        *self.state.on_request.borrow_mut() = Some(Box::new(hook));
    }

    pub(crate) fn requests(&self) -> Vec<StreamConstraints> {
        self.state.requests.borrow().clone()
    }
}

pub(crate) fn video_input(id: &str, label: &str) -> MediaDeviceInfo {
    MediaDeviceInfo {
        device_id: id.to_string(),
        kind: DeviceKind::VideoInput,
        label: label.to_string(),
    }
}

impl MediaHost for FakeHost {
    type Stream = FakeStream;

    async fn request_stream(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<FakeStream, HostError> {
        self.state.requests.borrow_mut().push(constraints.clone());
        if let Some(hook) = self.state.on_request.borrow().as_ref() {
            hook();
        }
        tokio::task::yield_now().await;
        self.state
            .responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(HostError::NotFound("no scripted response".to_string())))
    }

    async fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, HostError> {
        self.state
            .devices
            .borrow()
            .clone()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

// ============================================================================
// Sink
// ============================================================================

struct SinkState {
    attached: Option<String>,
    attach_count: usize,
    detach_count: usize,
    play_results: VecDeque<Result<(), HostError>>,
    playback_size: Option<Resolution>,
    frame: Option<RgbaImage>,
}

/// Render sink recording attach calls. Clones share state.
#[derive(Clone)]
pub(crate) struct FakeSink {
    state: Rc<RefCell<SinkState>>,
}

impl FakeSink {
    pub(crate) fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(SinkState {
                attached: None,
                attach_count: 0,
                detach_count: 0,
                play_results: VecDeque::new(),
                playback_size: None,
                frame: None,
            })),
        }
    }

    pub(crate) fn fail_next_play(&self, message: &str) {
        self.state
            .borrow_mut()
            .play_results
            .push_back(Err(HostError::Playback(message.to_string())));
    }

    pub(crate) fn set_playback_size(&self, size: Resolution) {
        self.state.borrow_mut().playback_size = Some(size);
    }

    pub(crate) fn set_frame(&self, frame: RgbaImage) {
        self.state.borrow_mut().frame = Some(frame);
    }

    pub(crate) fn attached(&self) -> Option<String> {
        self.state.borrow().attached.clone()
    }

    pub(crate) fn attach_count(&self) -> usize {
        self.state.borrow().attach_count
    }

    pub(crate) fn detach_count(&self) -> usize {
        self.state.borrow().detach_count
    }
}

impl RenderSink<FakeStream> for FakeSink {
    fn attach(&mut self, stream: &FakeStream) {
        let mut state = self.state.borrow_mut();
        state.attached = Some(stream.id().to_string());
        state.attach_count += 1;
    }

    fn detach(&mut self) {
        let mut state = self.state.borrow_mut();
        state.attached = None;
        state.detach_count += 1;
    }

    async fn play(&mut self) -> Result<(), HostError> {
        self.state
            .borrow_mut()
            .play_results
            .pop_front()
            .unwrap_or(Ok(()))
    }

    fn playback_size(&self) -> Option<Resolution> {
        self.state.borrow().playback_size
    }

    fn snapshot(&self) -> Option<RgbaImage> {
        self.state.borrow().frame.clone()
    }
}

/// Solid-colour frame for capture tests.
pub(crate) fn solid_frame(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}
