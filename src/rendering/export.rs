//! Export sizing for composed templates.
//!
//! The export renderer itself lives with the presentation layer; this module
//! only decides output dimensions and where each frame lands in pixels.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::template::{Frame, Template};

/// Print size the composed template is rendered at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../types/generated/")]
pub enum ExportPreset {
    #[default]
    #[serde(rename = "2r")]
    TwoR,
    #[serde(rename = "3r")]
    ThreeR,
    #[serde(rename = "4r")]
    FourR,
    #[serde(rename = "5r")]
    FiveR,
    #[serde(rename = "6r")]
    SixR,
    #[serde(rename = "custom")]
    Custom,
}

impl ExportPreset {
    pub const ALL: [ExportPreset; 6] = [
        ExportPreset::TwoR,
        ExportPreset::ThreeR,
        ExportPreset::FourR,
        ExportPreset::FiveR,
        ExportPreset::SixR,
        ExportPreset::Custom,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ExportPreset::TwoR => "2r",
            ExportPreset::ThreeR => "3r",
            ExportPreset::FourR => "4r",
            ExportPreset::FiveR => "5r",
            ExportPreset::SixR => "6r",
            ExportPreset::Custom => "custom",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id().eq_ignore_ascii_case(id))
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportPreset::TwoR => "2R (2.5×3.5 in)",
            ExportPreset::ThreeR => "3R (3.5×5 in)",
            ExportPreset::FourR => "4R (4×6 in)",
            ExportPreset::FiveR => "5R (5×7 in)",
            ExportPreset::SixR => "6R (6×8 in)",
            ExportPreset::Custom => "Custom",
        }
    }

    /// Nominal pixel size (portrait).
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            ExportPreset::TwoR => (750, 1050),
            ExportPreset::ThreeR => (1050, 1500),
            ExportPreset::FourR => (1200, 1800),
            ExportPreset::FiveR => (1500, 2100),
            ExportPreset::SixR => (1800, 2400),
            ExportPreset::Custom => (1200, 1800),
        }
    }
}

/// Aspect ratio assumed when no template is chosen.
pub const FALLBACK_ASPECT: f64 = 2.0 / 3.0;

/// Output size for a template: preset width, height from the template aspect.
pub fn export_size(preset: ExportPreset, template: Option<&Template>) -> (u32, u32) {
    let (width, _) = preset.dimensions();
    let aspect = template.map_or(FALLBACK_ASPECT, Template::aspect_ratio);
    let height = if aspect > 0.0 && aspect.is_finite() {
        (width as f64 / aspect).round().max(1.0) as u32
    } else {
        width
    };
    (width, height)
}

/// A frame placed on a pixel canvas.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../types/generated/")]
pub struct FramePixels {
    pub frame_id: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub radius: f64,
    pub rotation: f64,
}

/// Pixel rectangle of one frame on a `canvas_width x canvas_height` canvas.
pub fn frame_pixels(frame: &Frame, canvas_width: u32, canvas_height: u32) -> FramePixels {
    let px = |v: f64, size: u32| (v * size as f64).round().max(0.0) as u32;
    FramePixels {
        frame_id: frame.id.clone(),
        x: px(frame.x, canvas_width),
        y: px(frame.y, canvas_height),
        width: px(frame.width, canvas_width),
        height: px(frame.height, canvas_height),
        radius: frame.radius.unwrap_or(0.0),
        rotation: frame.rotation.unwrap_or(0.0),
    }
}

/// Every frame of `template` placed on a canvas of the given size, in slot order.
pub fn layout_frames(template: &Template, size: (u32, u32)) -> Vec<FramePixels> {
    template
        .frames
        .iter()
        .map(|f| frame_pixels(f, size.0, size.1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::preset_templates;

    #[test]
    fn test_preset_dimensions() {
        assert_eq!(ExportPreset::TwoR.dimensions(), (750, 1050));
        assert_eq!(ExportPreset::FourR.dimensions(), (1200, 1800));
        assert_eq!(ExportPreset::SixR.dimensions(), (1800, 2400));
        assert_eq!(ExportPreset::Custom.dimensions(), (1200, 1800));
    }

    #[test]
    fn test_preset_ids() {
        assert_eq!(ExportPreset::from_id("5R"), Some(ExportPreset::FiveR));
        assert_eq!(ExportPreset::from_id("9r"), None);
        let json = serde_json::to_string(&ExportPreset::ThreeR).unwrap();
        assert_eq!(json, "\"3r\"");
    }

    #[test]
    fn test_export_size_follows_template_aspect() {
        let presets = preset_templates();

        // Square grid, tall strip, wide postcard.
        assert_eq!(export_size(ExportPreset::TwoR, Some(&presets[0])), (750, 750));
        assert_eq!(export_size(ExportPreset::TwoR, Some(&presets[1])), (750, 1500));
        assert_eq!(export_size(ExportPreset::FourR, Some(&presets[2])), (1200, 750));
        assert_eq!(export_size(ExportPreset::FourR, None), (1200, 1800));
    }

    #[test]
    fn test_frame_pixels() {
        let strip = &preset_templates()[1];
        let pixels = layout_frames(strip, (strip.canvas_width, strip.canvas_height));

        assert_eq!(pixels.len(), 3);
        assert_eq!(pixels[0].frame_id, "s1");
        assert_eq!((pixels[0].x, pixels[0].y), (64, 80));
        assert_eq!((pixels[0].width, pixels[0].height), (672, 448));
        assert_eq!(pixels[0].radius, 16.0);
    }
}
