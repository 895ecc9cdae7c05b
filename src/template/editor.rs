//! Frame selection and drag state machine.
//!
//! `Idle -> Selected -> Dragging -> Selected`. A drag captures an immutable
//! snapshot of the frame geometry and the pointer origin when it starts;
//! every pointer move is measured against that snapshot, never against the
//! frame as it was last committed.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::geometry::{move_rect, resize_rect, ResizeHandle};
use super::types::{Frame, FrameRect};

/// Pointer position on the editing surface, in surface pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../types/generated/")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size of the editing surface the pointer moves over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../types/generated/")]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// What a drag does to the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", tag = "kind", content = "handle")]
#[ts(export, export_to = "../types/generated/")]
pub enum DragMode {
    Move,
    Resize(ResizeHandle),
}

/// Everything captured when a drag starts.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSnapshot {
    pub frame_id: String,
    pub mode: DragMode,
    /// Frame geometry at drag start.
    pub start: FrameRect,
    /// Pointer position at drag start.
    pub origin: Point,
    pub surface: SurfaceSize,
}

impl DragSnapshot {
    /// Normalized pointer delta from the drag origin.
    pub fn delta(&self, pointer: Point) -> (f64, f64) {
        let dx = if self.surface.width > 0.0 {
            (pointer.x - self.origin.x) / self.surface.width
        } else {
            0.0
        };
        let dy = if self.surface.height > 0.0 {
            (pointer.y - self.origin.y) / self.surface.height
        } else {
            0.0
        };
        (dx, dy)
    }

    /// Geometry the frame should take for this pointer position.
    pub fn proposed(&self, pointer: Point) -> FrameRect {
        let (dx, dy) = self.delta(pointer);
        match self.mode {
            DragMode::Move => move_rect(self.start, dx, dy),
            DragMode::Resize(handle) => resize_rect(self.start, handle, dx, dy),
        }
    }
}

/// Editor state for one template.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditorState {
    #[default]
    Idle,
    Selected {
        frame_id: String,
    },
    Dragging(DragSnapshot),
}

/// Selection and drag tracking. Does not own frames.
#[derive(Debug, Clone, Default)]
pub struct FrameEditor {
    state: EditorState,
}

impl FrameEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Frame currently selected (also while it is being dragged).
    pub fn selected(&self) -> Option<&str> {
        match &self.state {
            EditorState::Idle => None,
            EditorState::Selected { frame_id } => Some(frame_id),
            EditorState::Dragging(drag) => Some(&drag.frame_id),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, EditorState::Dragging(_))
    }

    pub fn drag(&self) -> Option<&DragSnapshot> {
        match &self.state {
            EditorState::Dragging(drag) => Some(drag),
            _ => None,
        }
    }

    /// Select a frame, or clear the selection. Ends any drag in progress.
    pub fn select(&mut self, frame_id: Option<String>) {
        self.state = match frame_id {
            Some(frame_id) => EditorState::Selected { frame_id },
            None => EditorState::Idle,
        };
    }

    /// Clear the selection if it refers to `frame_id`.
    pub fn forget(&mut self, frame_id: &str) {
        if self.selected() == Some(frame_id) {
            log::debug!("[TEMPLATES] Clearing selection of removed frame {}", frame_id);
            self.state = EditorState::Idle;
        }
    }

    pub fn clear(&mut self) {
        self.state = EditorState::Idle;
    }

    /// Begin a drag on `frame`, selecting it.
    pub fn start_drag(&mut self, frame: &Frame, mode: DragMode, origin: Point, surface: SurfaceSize) {
        self.state = EditorState::Dragging(DragSnapshot {
            frame_id: frame.id.clone(),
            mode,
            start: frame.rect(),
            origin,
            surface,
        });
    }

    /// Frame id and proposed geometry for a pointer move, if dragging.
    pub fn drag_to(&self, pointer: Point) -> Option<(&str, FrameRect)> {
        self.drag()
            .map(|drag| (drag.frame_id.as_str(), drag.proposed(pointer)))
    }

    /// End the drag unconditionally; the frame stays selected.
    /// Returns false if no drag was in progress.
    pub fn end_drag(&mut self) -> bool {
        match std::mem::take(&mut self.state) {
            EditorState::Dragging(drag) => {
                self.state = EditorState::Selected {
                    frame_id: drag.frame_id,
                };
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }
}
