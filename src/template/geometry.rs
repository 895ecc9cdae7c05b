//! Pure geometry for normalized frames.
//!
//! All math runs on whole snapping steps (hundredths of the canvas) so that
//! `x + width <= 1` holds exactly after every operation and repeated edits
//! cannot drift.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::types::{FrameRect, MAX_FRAME_RADIUS, MAX_FRAME_ROTATION, SNAP_STEP};

const STEPS_PER_UNIT: f64 = 1.0 / SNAP_STEP;

/// Whole canvas, in snapping steps.
const FULL: i64 = 100;
/// `MIN_FRAME_SIZE` in snapping steps.
const MIN: i64 = 5;

/// One of the four corner handles of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../types/generated/")]
pub enum ResizeHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 4] = [
        ResizeHandle::TopLeft,
        ResizeHandle::TopRight,
        ResizeHandle::BottomLeft,
        ResizeHandle::BottomRight,
    ];

    /// The corner that stays fixed while this handle is dragged.
    pub fn opposite(&self) -> ResizeHandle {
        match self {
            ResizeHandle::TopLeft => ResizeHandle::BottomRight,
            ResizeHandle::TopRight => ResizeHandle::BottomLeft,
            ResizeHandle::BottomLeft => ResizeHandle::TopRight,
            ResizeHandle::BottomRight => ResizeHandle::TopLeft,
        }
    }

    /// Coordinates of this corner on `rect`.
    pub fn corner_of(&self, rect: &FrameRect) -> (f64, f64) {
        match self {
            ResizeHandle::TopLeft => (rect.x, rect.y),
            ResizeHandle::TopRight => (rect.right(), rect.y),
            ResizeHandle::BottomLeft => (rect.x, rect.bottom()),
            ResizeHandle::BottomRight => (rect.right(), rect.bottom()),
        }
    }
}

/// Round to the nearest snapping step.
pub fn snap(value: f64) -> f64 {
    from_steps(to_steps(value))
}

fn to_steps(value: f64) -> i64 {
    // NaN casts to 0.
    (value * STEPS_PER_UNIT).round() as i64
}

fn from_steps(steps: i64) -> f64 {
    steps as f64 / STEPS_PER_UNIT
}

/// Non-panicking clamp; `hi` wins if the range is empty.
fn bound(value: i64, lo: i64, hi: i64) -> i64 {
    value.max(lo).min(hi)
}

#[derive(Clone, Copy)]
struct Steps {
    x: i64,
    y: i64,
    w: i64,
    h: i64,
}

impl Steps {
    /// Snap and clamp: size into `[MIN, FULL]`, then position inside the canvas.
    fn constrained(rect: &FrameRect) -> Self {
        let w = bound(to_steps(rect.width), MIN, FULL);
        let h = bound(to_steps(rect.height), MIN, FULL);
        Steps {
            x: bound(to_steps(rect.x), 0, FULL - w),
            y: bound(to_steps(rect.y), 0, FULL - h),
            w,
            h,
        }
    }

    fn rect(self) -> FrameRect {
        FrameRect::new(
            from_steps(self.x),
            from_steps(self.y),
            from_steps(self.w),
            from_steps(self.h),
        )
    }
}

/// Enforce every frame invariant: size clamped to `[0.05, 1]`, position kept
/// inside the canvas, all values snapped to 0.01.
pub fn constrain(rect: FrameRect) -> FrameRect {
    Steps::constrained(&rect).rect()
}

/// Move `start` by a normalized pointer delta, without crossing canvas edges.
pub fn move_rect(start: FrameRect, dx: f64, dy: f64) -> FrameRect {
    constrain(FrameRect {
        x: start.x + dx,
        y: start.y + dy,
        ..start
    })
}

/// Resize `start` by dragging one corner. The opposite corner stays fixed.
///
/// Width and height are floored at the minimum size before the anchored
/// corner is solved, so the rectangle never inverts.
pub fn resize_rect(start: FrameRect, handle: ResizeHandle, dx: f64, dy: f64) -> FrameRect {
    let s = Steps::constrained(&start);
    let (dx, dy) = (bound(to_steps(dx), -FULL, FULL), bound(to_steps(dy), -FULL, FULL));
    let right = s.x + s.w;
    let bottom = s.y + s.h;

    let (x, w) = match handle {
        ResizeHandle::TopLeft | ResizeHandle::BottomLeft => {
            let w = bound(s.w - dx, MIN, right);
            (right - w, w)
        }
        ResizeHandle::TopRight | ResizeHandle::BottomRight => {
            (s.x, bound(s.w + dx, MIN, FULL - s.x))
        }
    };
    let (y, h) = match handle {
        ResizeHandle::TopLeft | ResizeHandle::TopRight => {
            let h = bound(s.h - dy, MIN, bottom);
            (bottom - h, h)
        }
        ResizeHandle::BottomLeft | ResizeHandle::BottomRight => {
            (s.y, bound(s.h + dy, MIN, FULL - s.y))
        }
    };

    Steps { x, y, w, h }.rect()
}

pub fn clamp_radius(radius: f64) -> f64 {
    radius.max(0.0).min(MAX_FRAME_RADIUS)
}

pub fn clamp_rotation(rotation: f64) -> f64 {
    rotation.max(-MAX_FRAME_ROTATION).min(MAX_FRAME_ROTATION)
}
