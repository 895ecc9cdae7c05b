//! Built-in templates.

use super::types::{Frame, Template};

fn frame(id: &str, x: f64, y: f64, width: f64, height: f64, radius: f64) -> Frame {
    Frame {
        id: id.to_string(),
        x,
        y,
        width,
        height,
        radius: Some(radius),
        rotation: None,
    }
}

fn preset(id: &str, name: &str, size: (u32, u32), background: &str, frames: Vec<Frame>) -> Template {
    Template {
        id: id.to_string(),
        name: name.to_string(),
        canvas_width: size.0,
        canvas_height: size.1,
        background: background.to_string(),
        overlay: None,
        frames,
    }
}

/// The preset collection, in display order. The first is the default active one.
pub fn preset_templates() -> Vec<Template> {
    vec![
        preset(
            "preset-grid-2x2",
            "Grid 2×2",
            (1200, 1200),
            "#ffffff",
            vec![
                frame("f1", 0.05, 0.05, 0.45, 0.45, 12.0),
                frame("f2", 0.5, 0.05, 0.45, 0.45, 12.0),
                frame("f3", 0.05, 0.5, 0.45, 0.45, 12.0),
                frame("f4", 0.5, 0.5, 0.45, 0.45, 12.0),
            ],
        ),
        preset(
            "preset-strip-3",
            "Strip 3",
            (800, 1600),
            "#f8fafc",
            vec![
                frame("s1", 0.08, 0.05, 0.84, 0.28, 16.0),
                frame("s2", 0.08, 0.36, 0.84, 0.28, 16.0),
                frame("s3", 0.08, 0.67, 0.84, 0.28, 16.0),
            ],
        ),
        preset(
            "preset-postcard",
            "Postcard 2",
            (1600, 1000),
            "#ffffff",
            vec![
                frame("p1", 0.06, 0.1, 0.42, 0.8, 18.0),
                frame("p2", 0.52, 0.1, 0.42, 0.8, 18.0),
            ],
        ),
    ]
}
