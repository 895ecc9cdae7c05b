//! Template geometry model.
//!
//! A template is a canvas with an ordered list of normalized frames. The
//! library keeps the collection and the active template; the editor tracks
//! selection and drags; `geometry` holds the pure clamp/snap/move/resize math.

pub mod editor;
pub mod geometry;
pub mod library;
pub mod presets;
pub mod types;


pub use editor::{DragMode, DragSnapshot, EditorState, FrameEditor, Point, SurfaceSize};
pub use geometry::{constrain, move_rect, resize_rect, snap, ResizeHandle};
pub use library::{JsonFileStore, LibrarySnapshot, TemplateLibrary, TemplateStore};
pub use presets::preset_templates;
pub use types::{
    new_id, Frame, FramePatch, FrameRect, Template, TemplateMeta, MIN_FRAME_SIZE, SNAP_STEP,
};
