//! Template and frame data types.
//!
//! The `Template` shape is the complete, round-trippable state of a layout.
//! Frame geometry is normalized to `[0, 1]` relative to the template canvas.

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

/// Minimum frame width/height (5% of the canvas).
pub const MIN_FRAME_SIZE: f64 = 0.05;

/// Snapping step for normalized coordinates (1% of the canvas).
pub const SNAP_STEP: f64 = 0.01;

/// Largest corner radius a frame may carry, in canvas pixels.
pub const MAX_FRAME_RADIUS: f64 = 48.0;

/// Rotation range in degrees.
pub const MAX_FRAME_ROTATION: f64 = 180.0;

/// Tolerance used when checking invariants on snapped values.
pub const GEOMETRY_EPSILON: f64 = 1e-9;

pub(crate) const DEFAULT_BACKGROUND: &str = "#ffffff";

/// Fresh random identifier for templates and frames.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// ============================================================================
// Frame
// ============================================================================

/// Normalized rectangle without identity. Used for drag snapshots and
/// geometry math.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../types/generated/")]
pub struct FrameRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl FrameRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether the rectangle satisfies every frame invariant.
    pub fn is_valid(&self) -> bool {
        self.x >= -GEOMETRY_EPSILON
            && self.y >= -GEOMETRY_EPSILON
            && self.right() <= 1.0 + GEOMETRY_EPSILON
            && self.bottom() <= 1.0 + GEOMETRY_EPSILON
            && self.width >= MIN_FRAME_SIZE - GEOMETRY_EPSILON
            && self.height >= MIN_FRAME_SIZE - GEOMETRY_EPSILON
    }
}

/// A region of the template that displays one captured still.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../types/generated/")]
pub struct Frame {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Corner radius in canvas pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub radius: Option<f64>,
    /// Rotation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub rotation: Option<f64>,
}

impl Frame {
    pub fn rect(&self) -> FrameRect {
        FrameRect::new(self.x, self.y, self.width, self.height)
    }

    pub fn set_rect(&mut self, rect: FrameRect) {
        self.x = rect.x;
        self.y = rect.y;
        self.width = rect.width;
        self.height = rect.height;
    }

    /// Same geometry under a new id.
    pub fn with_fresh_id(&self) -> Frame {
        Frame {
            id: new_id(),
            ..self.clone()
        }
    }
}

/// Partial change to a frame. `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../types/generated/")]
pub struct FramePatch {
    #[ts(optional)]
    pub x: Option<f64>,
    #[ts(optional)]
    pub y: Option<f64>,
    #[ts(optional)]
    pub width: Option<f64>,
    #[ts(optional)]
    pub height: Option<f64>,
    #[ts(optional)]
    pub radius: Option<f64>,
    #[ts(optional)]
    pub rotation: Option<f64>,
}

impl FramePatch {
    /// Patch setting all four geometry fields.
    pub fn from_rect(rect: FrameRect) -> Self {
        Self {
            x: Some(rect.x),
            y: Some(rect.y),
            width: Some(rect.width),
            height: Some(rect.height),
            ..Self::default()
        }
    }
}

// ============================================================================
// Template
// ============================================================================

/// A composable layout of frames on a fixed-size canvas.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../types/generated/")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Canvas background colour.
    pub background: String,
    /// Optional overlay image drawn above the frames.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub overlay: Option<String>,
    /// Ordered frames; frame `i` receives the `i`-th capture.
    pub frames: Vec<Frame>,
}

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_string()
}

/// Stored template shape. Older stores wrote the background as `bg`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TemplateRecord {
    id: String,
    name: String,
    canvas_width: u32,
    canvas_height: u32,
    #[serde(default = "default_background", alias = "bg")]
    background: String,
    #[serde(default)]
    overlay: Option<String>,
    #[serde(default)]
    frames: Vec<Frame>,
}

impl<'de> Deserialize<'de> for Template {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let record = TemplateRecord::deserialize(deserializer)?;
        Ok(Template {
            id: record.id,
            name: record.name,
            canvas_width: record.canvas_width,
            canvas_height: record.canvas_height,
            background: record.background,
            overlay: record.overlay,
            frames: record.frames,
        })
    }
}

impl Template {
    /// Empty template with a fresh id.
    pub fn new(name: impl Into<String>, canvas_width: u32, canvas_height: u32) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            canvas_width: canvas_width.max(1),
            canvas_height: canvas_height.max(1),
            background: default_background(),
            overlay: None,
            frames: Vec::new(),
        }
    }

    /// Width over height of the canvas.
    pub fn aspect_ratio(&self) -> f64 {
        if self.canvas_height == 0 {
            return 1.0;
        }
        self.canvas_width as f64 / self.canvas_height as f64
    }

    pub fn frame(&self, id: &str) -> Option<&Frame> {
        self.frames.iter().find(|f| f.id == id)
    }

    pub fn frame_mut(&mut self, id: &str) -> Option<&mut Frame> {
        self.frames.iter_mut().find(|f| f.id == id)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Deep copy named "<name> (copy)" with fresh template and frame ids.
    pub fn duplicate(&self) -> Template {
        Template {
            id: new_id(),
            name: format!("{} (copy)", self.name),
            frames: self.frames.iter().map(Frame::with_fresh_id).collect(),
            ..self.clone()
        }
    }
}

/// Partial change to template metadata. Frames and id are not touched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../types/generated/")]
pub struct TemplateMeta {
    #[ts(optional)]
    pub name: Option<String>,
    #[ts(optional)]
    pub canvas_width: Option<u32>,
    #[ts(optional)]
    pub canvas_height: Option<u32>,
    #[ts(optional)]
    pub background: Option<String>,
    /// `Some("")` removes the overlay.
    #[ts(optional)]
    pub overlay: Option<String>,
}

impl TemplateMeta {
    pub(crate) fn apply_to(self, template: &mut Template) {
        if let Some(name) = self.name {
            template.name = name;
        }
        if let Some(w) = self.canvas_width {
            template.canvas_width = w.max(1);
        }
        if let Some(h) = self.canvas_height {
            template.canvas_height = h.max(1);
        }
        if let Some(bg) = self.background {
            template.background = bg;
        }
        if let Some(overlay) = self.overlay {
            template.overlay = if overlay.is_empty() {
                None
            } else {
                Some(overlay)
            };
        }
    }
}
