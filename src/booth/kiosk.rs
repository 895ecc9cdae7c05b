//! Headless kiosk sequencer.
//!
//! Owns the unattended capture flow: attract overlay, countdown,
//! auto-sequenced captures, the final screen and the auto-reset back to the
//! start. Time is passed in, so the caller decides how to wait (a tokio sleep
//! until [`KioskSequencer::next_deadline`], a UI frame tick, a test clock).
//! The sequencer never touches the camera; it returns [`KioskAction`]s and
//! [`KioskSequencer::drive`] applies them to a [`PhotoBooth`].

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::PhotoBooth;
use crate::camera::{MediaHost, RenderSink};
use crate::config::KioskConfig;
use crate::template::Template;

const COUNTDOWN_TICK: Duration = Duration::from_secs(1);
/// Delay between the countdown reaching zero and the capture.
const CAPTURE_SETTLE: Duration = Duration::from_millis(120);
const CAPTURED_HINT: Duration = Duration::from_millis(600);
/// Gap between a capture and the next auto-sequenced countdown.
const NEXT_COUNTDOWN_DELAY: Duration = Duration::from_millis(800);
const FINAL_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../types/generated/")]
pub enum KioskScreen {
    Capture,
    Final,
}

/// Guidance shown to the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export, export_to = "../types/generated/")]
pub enum HintState {
    Idle,
    CameraInit,
    Ready,
    Countdown,
    Captured,
    Processing,
    Complete,
}

/// Something the caller has to do (or show) as a result of a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KioskAction {
    /// Take a still now.
    Capture,
    /// Countdown moved to this value.
    CountdownTick(u32),
    ShowFinal,
    /// Clear the capture list; the sequencer is back at the start.
    ResetCaptures,
    ShowAttract,
}

/// Booth counters the sequencer decides on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KioskView {
    pub streaming: bool,
    pub captured: usize,
    pub total_frames: usize,
}

impl KioskView {
    /// Every frame of the template has a still. A template without frames is
    /// never filled.
    pub fn all_filled(&self) -> bool {
        self.total_frames > 0 && self.captured >= self.total_frames
    }
}

#[derive(Debug, Clone, Copy)]
struct Countdown {
    value: u32,
    next_tick: Instant,
}

pub struct KioskSequencer {
    countdown_seconds: u32,
    idle_timeout: Duration,
    final_auto_reset: Duration,
    chroma_key: bool,

    screen: KioskScreen,
    show_attract: bool,
    auto_sequence: bool,
    countdown: Option<Countdown>,
    capture_due: Option<Instant>,
    awaiting_capture: bool,
    captured_hint_until: Option<Instant>,
    next_countdown_at: Option<Instant>,
    final_at: Option<Instant>,
    reset_at: Option<Instant>,
    last_activity: Instant,
}

impl KioskSequencer {
    pub fn new(config: &KioskConfig, now: Instant) -> Self {
        Self {
            countdown_seconds: config.countdown_seconds.max(1),
            idle_timeout: config.capture_idle_timeout(),
            final_auto_reset: config.final_auto_reset(),
            chroma_key: config.chroma_key,
            screen: KioskScreen::Capture,
            show_attract: true,
            auto_sequence: false,
            countdown: None,
            capture_due: None,
            awaiting_capture: false,
            captured_hint_until: None,
            next_countdown_at: None,
            final_at: None,
            reset_at: None,
            last_activity: now,
        }
    }

    pub fn screen(&self) -> KioskScreen {
        self.screen
    }

    pub fn is_attract_visible(&self) -> bool {
        self.show_attract && self.screen == KioskScreen::Capture
    }

    pub fn is_auto_sequencing(&self) -> bool {
        self.auto_sequence
    }

    pub fn countdown_value(&self) -> Option<u32> {
        self.countdown.map(|c| c.value)
    }

    /// Whether the capture button is enabled.
    pub fn can_capture(&self, view: KioskView) -> bool {
        view.streaming
            && self.screen == KioskScreen::Capture
            && self.countdown.is_none()
            && self.capture_due.is_none()
            && !self.awaiting_capture
            && !view.all_filled()
    }

    // ===== Input =====

    /// Guest dismissed the attract overlay.
    pub fn tap_attract(&mut self, now: Instant) {
        self.show_attract = false;
        self.last_activity = now;
    }

    /// Any pointer or key activity on the capture screen.
    pub fn activity(&mut self, now: Instant) {
        self.last_activity = now;
    }

    /// Capture button. Starts auto-sequencing and the first countdown.
    pub fn press_capture(&mut self, now: Instant, view: KioskView) -> bool {
        if !self.can_capture(view) {
            return false;
        }
        self.last_activity = now;
        self.show_attract = false;
        self.auto_sequence = true;
        self.start_countdown(now);
        true
    }

    /// Back to the start: capture screen, attract shown, nothing pending.
    /// The caller clears the capture list.
    pub fn start_over(&mut self, now: Instant) {
        log::info!("[KIOSK] Starting over");
        self.screen = KioskScreen::Capture;
        self.show_attract = true;
        self.auto_sequence = false;
        self.countdown = None;
        self.capture_due = None;
        self.awaiting_capture = false;
        self.captured_hint_until = None;
        self.next_countdown_at = None;
        self.final_at = None;
        self.reset_at = None;
        self.last_activity = now;
    }

    /// A `Capture` action produced a still.
    pub fn capture_completed(&mut self, now: Instant, view: KioskView) {
        self.awaiting_capture = false;
        self.captured_hint_until = Some(now + CAPTURED_HINT);
        self.schedule_next_countdown(now, view);
    }

    /// A `Capture` action failed; the sequence carries on.
    pub fn capture_failed(&mut self, now: Instant, view: KioskView) {
        self.awaiting_capture = false;
        self.schedule_next_countdown(now, view);
    }

    // ===== Timers =====

    /// Advance every timer to `now` and return what became due.
    pub fn poll(&mut self, now: Instant, view: KioskView) -> Vec<KioskAction> {
        let mut actions = Vec::new();

        if self.captured_hint_until.is_some_and(|until| until <= now) {
            self.captured_hint_until = None;
        }

        if self.screen == KioskScreen::Final {
            if self.reset_at.is_some_and(|at| at <= now) {
                self.start_over(now);
                actions.push(KioskAction::ResetCaptures);
                actions.push(KioskAction::ShowAttract);
            }
            return actions;
        }

        if view.all_filled() {
            self.next_countdown_at = None;
            let final_at = *self.final_at.get_or_insert(now + FINAL_DELAY);
            if final_at <= now {
                log::info!("[KIOSK] All {} frames filled, showing final", view.total_frames);
                self.screen = KioskScreen::Final;
                self.final_at = None;
                self.reset_at = Some(now + self.final_auto_reset);
                actions.push(KioskAction::ShowFinal);
            }
            return actions;
        }
        self.final_at = None;

        while let Some(mut countdown) = self.countdown {
            if countdown.next_tick > now {
                break;
            }
            countdown.value = countdown.value.saturating_sub(1);
            actions.push(KioskAction::CountdownTick(countdown.value));
            if countdown.value == 0 {
                self.countdown = None;
                self.capture_due = Some(countdown.next_tick + CAPTURE_SETTLE);
            } else {
                countdown.next_tick += COUNTDOWN_TICK;
                self.countdown = Some(countdown);
            }
        }

        if self.capture_due.is_some_and(|at| at <= now) {
            self.capture_due = None;
            self.awaiting_capture = true;
            actions.push(KioskAction::Capture);
        }

        if self.next_countdown_at.is_some_and(|at| at <= now) && view.streaming {
            self.next_countdown_at = None;
            if self.auto_sequence && self.countdown.is_none() {
                self.start_countdown(now);
            }
        }

        if self.idle_due(now) {
            log::debug!("[KIOSK] Capture screen idle, showing attract");
            self.show_attract = true;
            actions.push(KioskAction::ShowAttract);
        }

        actions
    }

    /// Earliest instant at which [`poll`](Self::poll) has something to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let idle = (!self.show_attract && !self.auto_sequence && self.countdown.is_none())
            .then(|| self.last_activity + self.idle_timeout);
        [
            self.countdown.map(|c| c.next_tick),
            self.capture_due,
            self.captured_hint_until,
            self.next_countdown_at,
            self.final_at,
            self.reset_at,
            idle,
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Guidance for the current moment.
    pub fn hint(&self, now: Instant, view: KioskView) -> HintState {
        if self.screen == KioskScreen::Final {
            HintState::Complete
        } else if self.show_attract {
            HintState::Idle
        } else if view.all_filled() {
            HintState::Processing
        } else if !view.streaming {
            HintState::CameraInit
        } else if self.countdown.is_some() {
            HintState::Countdown
        } else if self.captured_hint_until.is_some_and(|until| until > now) {
            HintState::Captured
        } else {
            HintState::Ready
        }
    }

    /// Poll, then carry out the resulting actions on `booth`.
    pub fn drive<H: MediaHost, K: RenderSink<H::Stream>>(
        &mut self,
        booth: &mut PhotoBooth<H, K>,
        template: Option<&Template>,
        now: Instant,
    ) -> Vec<KioskAction> {
        let actions = self.poll(now, booth.kiosk_view(template));
        for action in &actions {
            match action {
                KioskAction::Capture => match booth.capture_still(self.chroma_key).map(|_| ()) {
                    Ok(()) => self.capture_completed(now, booth.kiosk_view(template)),
                    Err(e) => {
                        log::warn!("[KIOSK] Capture failed: {}", e);
                        self.capture_failed(now, booth.kiosk_view(template));
                    }
                },
                KioskAction::ResetCaptures => booth.reset_captures(),
                KioskAction::CountdownTick(_)
                | KioskAction::ShowFinal
                | KioskAction::ShowAttract => {}
            }
        }
        actions
    }

    fn start_countdown(&mut self, now: Instant) {
        log::debug!("[KIOSK] Countdown from {}", self.countdown_seconds);
        self.countdown = Some(Countdown {
            value: self.countdown_seconds,
            next_tick: now + COUNTDOWN_TICK,
        });
    }

    fn schedule_next_countdown(&mut self, now: Instant, view: KioskView) {
        if self.auto_sequence && !view.all_filled() {
            self.next_countdown_at = Some(now + NEXT_COUNTDOWN_DELAY);
        }
    }

    fn idle_due(&self, now: Instant) -> bool {
        !self.show_attract
            && !self.auto_sequence
            && self.countdown.is_none()
            && now.saturating_duration_since(self.last_activity) >= self.idle_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booth::PhotoBooth;
    use crate::camera::testing::{fake_stream, solid_frame, FakeHost, FakeSink};
    use crate::camera::SessionPreferences;
    use crate::template::preset_templates;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn view(captured: usize, total: usize) -> KioskView {
        KioskView {
            streaming: true,
            captured,
            total_frames: total,
        }
    }

    fn sequencer(t0: Instant) -> KioskSequencer {
        KioskSequencer::new(&KioskConfig::default(), t0)
    }

    #[test]
    fn test_starts_on_attract() {
        let t0 = Instant::now();
        let kiosk = sequencer(t0);
        assert!(kiosk.is_attract_visible());
        assert_eq!(kiosk.hint(t0, view(0, 3)), HintState::Idle);
    }

    #[test]
    fn test_hint_without_stream() {
        let t0 = Instant::now();
        let mut kiosk = sequencer(t0);
        kiosk.tap_attract(t0);
        let offline = KioskView {
            streaming: false,
            ..view(0, 3)
        };
        assert_eq!(kiosk.hint(t0, offline), HintState::CameraInit);
        assert!(!kiosk.press_capture(t0, offline));
        assert_eq!(kiosk.hint(t0, view(0, 3)), HintState::Ready);
    }

    #[test]
    fn test_countdown_then_capture_after_settle() {
        let t0 = Instant::now();
        let mut kiosk = sequencer(t0);
        kiosk.tap_attract(t0);

        assert!(kiosk.press_capture(t0, view(0, 3)));
        assert_eq!(kiosk.countdown_value(), Some(3));
        assert_eq!(kiosk.hint(t0, view(0, 3)), HintState::Countdown);
        assert!(!kiosk.press_capture(t0, view(0, 3)));

        assert_eq!(kiosk.poll(t0 + ms(1000), view(0, 3)), vec![KioskAction::CountdownTick(2)]);
        assert_eq!(kiosk.poll(t0 + ms(2000), view(0, 3)), vec![KioskAction::CountdownTick(1)]);
        assert_eq!(kiosk.poll(t0 + ms(3000), view(0, 3)), vec![KioskAction::CountdownTick(0)]);
        assert_eq!(kiosk.countdown_value(), None);

        assert!(kiosk.poll(t0 + ms(3100), view(0, 3)).is_empty());
        assert_eq!(kiosk.poll(t0 + ms(3120), view(0, 3)), vec![KioskAction::Capture]);
    }

    #[test]
    fn test_late_poll_catches_up() {
        let t0 = Instant::now();
        let mut kiosk = sequencer(t0);
        kiosk.press_capture(t0, view(0, 1));

        let actions = kiosk.poll(t0 + ms(5000), view(0, 1));
        assert_eq!(
            actions,
            vec![
                KioskAction::CountdownTick(2),
                KioskAction::CountdownTick(1),
                KioskAction::CountdownTick(0),
                KioskAction::Capture,
            ]
        );
    }

    #[test]
    fn test_auto_sequence_schedules_next_countdown() {
        let t0 = Instant::now();
        let mut kiosk = sequencer(t0);
        kiosk.press_capture(t0, view(0, 2));
        kiosk.poll(t0 + ms(3120), view(0, 2));

        let captured_at = t0 + ms(3120);
        kiosk.capture_completed(captured_at, view(1, 2));
        assert_eq!(kiosk.hint(captured_at + ms(100), view(1, 2)), HintState::Captured);
        assert_eq!(kiosk.hint(captured_at + ms(600), view(1, 2)), HintState::Ready);

        kiosk.poll(captured_at + ms(799), view(1, 2));
        assert_eq!(kiosk.countdown_value(), None);
        kiosk.poll(captured_at + ms(800), view(1, 2));
        assert_eq!(kiosk.countdown_value(), Some(3));
    }

    #[test]
    fn test_next_deadline_skips_expired_hint() {
        let t0 = Instant::now();
        let mut kiosk = sequencer(t0);
        kiosk.press_capture(t0, view(0, 3));
        kiosk.poll(t0 + ms(3120), view(0, 3));
        kiosk.capture_completed(t0 + ms(3120), view(1, 3));

        kiosk.poll(t0 + ms(3920), view(1, 3));
        assert_eq!(kiosk.countdown_value(), Some(3));

        let now = t0 + ms(4500);
        kiosk.poll(now, view(1, 3));
        let deadline = kiosk.next_deadline().unwrap();
        assert!(deadline > now);
        assert_eq!(deadline, t0 + ms(4920));
    }

    #[test]
    fn test_failed_capture_retries() {
        let t0 = Instant::now();
        let mut kiosk = sequencer(t0);
        kiosk.press_capture(t0, view(0, 2));
        kiosk.poll(t0 + ms(3120), view(0, 2));

        kiosk.capture_failed(t0 + ms(3200), view(0, 2));
        assert_eq!(kiosk.hint(t0 + ms(3300), view(0, 2)), HintState::Ready);
        kiosk.poll(t0 + ms(4000), view(0, 2));
        assert_eq!(kiosk.countdown_value(), Some(3));
    }

    #[test]
    fn test_final_then_auto_reset() {
        let t0 = Instant::now();
        let mut kiosk = sequencer(t0);
        kiosk.press_capture(t0, view(0, 1));
        kiosk.poll(t0 + ms(3120), view(0, 1));
        kiosk.capture_completed(t0 + ms(3120), view(1, 1));

        let filled = view(1, 1);
        assert!(kiosk.poll(t0 + ms(3200), filled).is_empty());
        assert_eq!(kiosk.hint(t0 + ms(3200), filled), HintState::Processing);
        assert_eq!(kiosk.poll(t0 + ms(3700), filled), vec![KioskAction::ShowFinal]);
        assert_eq!(kiosk.screen(), KioskScreen::Final);
        assert_eq!(kiosk.hint(t0 + ms(3700), filled), HintState::Complete);

        let reset_at = t0 + ms(3700) + ms(25_000);
        assert!(kiosk.poll(reset_at - ms(1), filled).is_empty());
        assert_eq!(
            kiosk.poll(reset_at, filled),
            vec![KioskAction::ResetCaptures, KioskAction::ShowAttract]
        );
        assert_eq!(kiosk.screen(), KioskScreen::Capture);
        assert!(kiosk.is_attract_visible());
        assert!(!kiosk.is_auto_sequencing());
    }

    #[test]
    fn test_idle_shows_attract() {
        let t0 = Instant::now();
        let mut kiosk = sequencer(t0);
        kiosk.tap_attract(t0);
        kiosk.activity(t0 + ms(10_000));

        assert!(kiosk.poll(t0 + ms(45_000), view(0, 3)).is_empty());
        assert_eq!(kiosk.next_deadline(), Some(t0 + ms(55_000)));
        assert_eq!(
            kiosk.poll(t0 + ms(55_000), view(0, 3)),
            vec![KioskAction::ShowAttract]
        );
        assert!(kiosk.is_attract_visible());
    }

    #[test]
    fn test_no_idle_while_sequencing() {
        let t0 = Instant::now();
        let mut kiosk = sequencer(t0);
        kiosk.press_capture(t0, view(0, 3));
        kiosk.poll(t0 + ms(3120), view(0, 3));

        let actions = kiosk.poll(t0 + ms(120_000), view(0, 3));
        assert!(!actions.contains(&KioskAction::ShowAttract));
    }

    #[test]
    fn test_empty_template_never_fills() {
        assert!(!KioskView::default().all_filled());
        assert!(view(2, 2).all_filled());
    }

    #[tokio::test]
    async fn test_drive_fills_template() {
        let host = FakeHost::new();
        let sink = FakeSink::new();
        let (stream, _control) = fake_stream("stream-1", 4, 4);
        host.push_stream(stream);
        sink.set_frame(solid_frame(4, 4, [10, 20, 30, 255]));
        let mut booth = PhotoBooth::new(host, sink);
        booth.start_session(SessionPreferences::default()).await.unwrap();

        let postcard = preset_templates().remove(2);
        let t0 = Instant::now();
        let mut kiosk = sequencer(t0);
        kiosk.tap_attract(t0);
        assert!(kiosk.press_capture(t0, booth.kiosk_view(Some(&postcard))));

        let mut now = t0;
        let mut finals = 0;
        for _ in 0..200 {
            now += ms(50);
            let actions = kiosk.drive(&mut booth, Some(&postcard), now);
            finals += actions.iter().filter(|a| **a == KioskAction::ShowFinal).count();
            if kiosk.screen() == KioskScreen::Final {
                break;
            }
        }

        assert_eq!(finals, 1);
        assert_eq!(booth.capture_count(), 2);

        kiosk.drive(&mut booth, Some(&postcard), now + ms(25_000));
        assert_eq!(booth.capture_count(), 0);
        assert_eq!(kiosk.screen(), KioskScreen::Capture);
    }
}
