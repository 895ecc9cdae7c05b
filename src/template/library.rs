//! Template collection with an active template and frame editing.
//!
//! Every frame mutation goes through [`TemplateLibrary::update_frame`] (or
//! the same constraint path on insert), so the stored frames always satisfy
//! the geometry invariants.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::editor::{DragMode, EditorState, FrameEditor, Point, SurfaceSize};
use super::geometry::{clamp_radius, clamp_rotation, constrain, ResizeHandle};
use super::presets::preset_templates;
use super::types::{new_id, Frame, FramePatch, FrameRect, Template, TemplateMeta};
use crate::error::{BoothError, BoothResult, ResultExt};

/// Geometry used when a frame is added without any.
pub const DEFAULT_FRAME: FrameRect = FrameRect {
    x: 0.1,
    y: 0.1,
    width: 0.3,
    height: 0.3,
};

/// Corner radius used when a frame is added without one.
pub const DEFAULT_FRAME_RADIUS: f64 = 12.0;

// ============================================================================
// Persistence boundary
// ============================================================================

/// Complete library state handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../types/generated/")]
pub struct LibrarySnapshot {
    pub templates: Vec<Template>,
    #[serde(default)]
    pub active_template_id: Option<String>,
}

/// Where template collections are kept between runs.
pub trait TemplateStore {
    /// Stored snapshot, or `None` if nothing was saved yet.
    fn load(&self) -> BoothResult<Option<LibrarySnapshot>>;

    fn save(&self, snapshot: &LibrarySnapshot) -> BoothResult<()>;
}

/// Store keeping the snapshot as one JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TemplateStore for JsonFileStore {
    fn load(&self) -> BoothResult<Option<LibrarySnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let snapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &LibrarySnapshot) -> BoothResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, content)?;
        log::debug!(
            "[TEMPLATES] Saved {} template(s) to {}",
            snapshot.templates.len(),
            self.path.display()
        );
        Ok(())
    }
}

// ============================================================================
// Library
// ============================================================================

/// Owns every template, which one is active and the frame editor state.
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    templates: Vec<Template>,
    active_id: Option<String>,
    editor: FrameEditor,
}

impl Default for TemplateLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateLibrary {
    /// Library holding the presets, first preset active.
    pub fn new() -> Self {
        let templates = preset_templates();
        let active_id = templates.first().map(|t| t.id.clone());
        Self {
            templates,
            active_id,
            editor: FrameEditor::new(),
        }
    }

    /// Restore from a snapshot. An empty snapshot keeps the presets; an
    /// unknown active id falls back to the first template.
    pub fn from_snapshot(snapshot: LibrarySnapshot) -> Self {
        if snapshot.templates.is_empty() {
            log::info!("[TEMPLATES] Empty snapshot, using presets");
            return Self::new();
        }

        let mut templates = snapshot.templates;
        for template in &mut templates {
            for frame in &mut template.frames {
                frame.set_rect(constrain(frame.rect()));
            }
        }

        let active_id = snapshot
            .active_template_id
            .filter(|id| templates.iter().any(|t| &t.id == id))
            .or_else(|| templates.first().map(|t| t.id.clone()));

        Self {
            templates,
            active_id,
            editor: FrameEditor::new(),
        }
    }

    /// Load from a store. Failures are logged and yield the presets.
    pub fn load_from(store: &impl TemplateStore) -> Self {
        match store.load() {
            Ok(Some(snapshot)) => Self::from_snapshot(snapshot),
            Ok(None) => Self::new(),
            Err(e) => {
                log::warn!("[TEMPLATES] Failed to load templates: {}", e);
                Self::new()
            }
        }
    }

    pub fn save_to(&self, store: &impl TemplateStore) -> BoothResult<()> {
        store.save(&self.snapshot())
    }

    pub fn snapshot(&self) -> LibrarySnapshot {
        LibrarySnapshot {
            templates: self.templates.clone(),
            active_template_id: self.active_id.clone(),
        }
    }

    /// Replace everything with the presets.
    pub fn reset_to_presets(&mut self) {
        *self = Self::new();
    }

    // ------------------------------------------------------------------
    // Templates
    // ------------------------------------------------------------------

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn template(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn active_template_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active_template(&self) -> Option<&Template> {
        self.active_id.as_deref().and_then(|id| self.template(id))
    }

    fn active_mut(&mut self) -> BoothResult<&mut Template> {
        let id = self.active_id.as_deref().ok_or(BoothError::NoActiveTemplate)?;
        self.templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(BoothError::NoActiveTemplate)
    }

    /// Create an empty template and make it active. Returns its id.
    pub fn create_template(
        &mut self,
        name: impl Into<String>,
        canvas_width: u32,
        canvas_height: u32,
    ) -> String {
        let template = Template::new(name, canvas_width, canvas_height);
        let id = template.id.clone();
        log::info!("[TEMPLATES] Created template {} ({})", template.name, id);
        self.templates.push(template);
        self.activate(Some(id.clone()));
        id
    }

    /// Change name, canvas size, background or overlay of the active template.
    pub fn update_template_meta(&mut self, meta: TemplateMeta) -> BoothResult<()> {
        let template = self.active_mut()?;
        meta.apply_to(template);
        Ok(())
    }

    /// Switch the active template, or clear it with `None`.
    pub fn set_active_template(&mut self, id: Option<&str>) -> BoothResult<()> {
        if let Some(id) = id {
            if self.template(id).is_none() {
                return Err(BoothError::TemplateNotFound { id: id.to_string() });
            }
        }
        self.activate(id.map(str::to_string));
        Ok(())
    }

    fn activate(&mut self, id: Option<String>) {
        if self.active_id != id {
            self.editor.clear();
        }
        self.active_id = id;
    }

    /// Copy a template with fresh ids, append it and make it active.
    pub fn duplicate_template(&mut self, id: &str) -> BoothResult<String> {
        let copy = self
            .template(id)
            .ok_or_else(|| BoothError::TemplateNotFound { id: id.to_string() })?
            .duplicate();
        let copy_id = copy.id.clone();
        log::info!("[TEMPLATES] Duplicated {} as {}", id, copy_id);
        self.templates.push(copy);
        self.activate(Some(copy_id.clone()));
        Ok(copy_id)
    }

    /// Delete a template. Clears the frame selection; if it was active, the
    /// first remaining template (or none) becomes active.
    pub fn delete_template(&mut self, id: &str) -> BoothResult<()> {
        let index = self
            .templates
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| BoothError::TemplateNotFound { id: id.to_string() })?;
        self.templates.remove(index);
        self.editor.clear();

        if self.active_id.as_deref() == Some(id) {
            self.active_id = self.templates.first().map(|t| t.id.clone());
        }
        log::info!(
            "[TEMPLATES] Deleted {}; active is now {:?}",
            id,
            self.active_id
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Frames (active template)
    // ------------------------------------------------------------------

    /// Add a frame to the active template and select it.
    pub fn add_frame(&mut self, patch: Option<FramePatch>) -> BoothResult<Frame> {
        let patch = patch.unwrap_or_default();
        let mut frame = Frame {
            id: new_id(),
            x: DEFAULT_FRAME.x,
            y: DEFAULT_FRAME.y,
            width: DEFAULT_FRAME.width,
            height: DEFAULT_FRAME.height,
            radius: Some(DEFAULT_FRAME_RADIUS),
            rotation: None,
        };
        apply_patch(&mut frame, &patch);

        let template = self.active_mut()?;
        template.frames.push(frame.clone());
        self.editor.select(Some(frame.id.clone()));
        Ok(frame)
    }

    /// Remove a frame from the active template.
    pub fn remove_frame(&mut self, frame_id: &str) -> BoothResult<()> {
        let template = self.active_mut()?;
        let index = template
            .frames
            .iter()
            .position(|f| f.id == frame_id)
            .ok_or_else(|| BoothError::FrameNotFound {
                id: frame_id.to_string(),
            })?;
        template.frames.remove(index);
        self.editor.forget(frame_id);
        Ok(())
    }

    /// Apply a partial change and re-enforce the frame invariants.
    pub fn update_frame(&mut self, frame_id: &str, patch: FramePatch) -> BoothResult<Frame> {
        let template = self.active_mut()?;
        let frame = template
            .frame_mut(frame_id)
            .ok_or_else(|| BoothError::FrameNotFound {
                id: frame_id.to_string(),
            })?;
        apply_patch(frame, &patch);
        Ok(frame.clone())
    }

    /// Select a frame of the active template, or clear the selection.
    pub fn select_frame(&mut self, frame_id: Option<&str>) -> BoothResult<()> {
        if let Some(id) = frame_id {
            let exists = self
                .active_template()
                .and_then(|t| t.frame(id))
                .is_some();
            if !exists {
                return Err(BoothError::FrameNotFound { id: id.to_string() });
            }
        }
        self.editor.select(frame_id.map(str::to_string));
        Ok(())
    }

    pub fn selected_frame_id(&self) -> Option<&str> {
        self.editor.selected()
    }

    pub fn editor_state(&self) -> &EditorState {
        self.editor.state()
    }

    // ------------------------------------------------------------------
    // Interactive editing
    // ------------------------------------------------------------------

    pub fn begin_move(&mut self, frame_id: &str, origin: Point, surface: SurfaceSize) -> BoothResult<()> {
        self.begin_drag(frame_id, DragMode::Move, origin, surface)
    }

    pub fn begin_resize(
        &mut self,
        frame_id: &str,
        handle: ResizeHandle,
        origin: Point,
        surface: SurfaceSize,
    ) -> BoothResult<()> {
        self.begin_drag(frame_id, DragMode::Resize(handle), origin, surface)
    }

    fn begin_drag(
        &mut self,
        frame_id: &str,
        mode: DragMode,
        origin: Point,
        surface: SurfaceSize,
    ) -> BoothResult<()> {
        let frame = self
            .active_template()
            .ok_or(BoothError::NoActiveTemplate)?
            .frame(frame_id)
            .cloned()
            .ok_or_else(|| BoothError::FrameNotFound {
                id: frame_id.to_string(),
            })?;
        self.editor.start_drag(&frame, mode, origin, surface);
        Ok(())
    }

    /// Commit the geometry for a pointer move. `None` when no drag is active.
    pub fn drag_to(&mut self, pointer: Point) -> BoothResult<Option<Frame>> {
        let Some((frame_id, rect)) = self.editor.drag_to(pointer) else {
            return Ok(None);
        };
        let frame_id = frame_id.to_string();
        match self.update_frame(&frame_id, FramePatch::from_rect(rect)) {
            Ok(frame) => Ok(Some(frame)),
            Err(e) => {
                self.editor.clear();
                Err(e)
            }
        }
    }

    /// End the current drag, wherever the pointer was released.
    pub fn end_drag(&mut self) -> bool {
        self.editor.end_drag()
    }
}

fn apply_patch(frame: &mut Frame, patch: &FramePatch) {
    let mut rect = frame.rect();
    if let Some(x) = patch.x {
        rect.x = x;
    }
    if let Some(y) = patch.y {
        rect.y = y;
    }
    if let Some(width) = patch.width {
        rect.width = width;
    }
    if let Some(height) = patch.height {
        rect.height = height;
    }
    frame.set_rect(constrain(rect));

    if let Some(radius) = patch.radius {
        frame.radius = Some(clamp_radius(radius));
    }
    if let Some(rotation) = patch.rotation {
        frame.rotation = Some(clamp_rotation(rotation));
    }
}
