//! Raster handling for captured stills.
//!
//! ## Components
//! - `raster`: decode / encode between bytes and RGBA buffers
//! - `chroma_key`: per-pixel green-screen removal
//! - `export`: print presets and pixel metrics for composed layouts

pub mod chroma_key;
pub mod export;
pub mod raster;

pub use chroma_key::{apply_chroma_key, chroma_key_png, is_key_pixel};
pub use export::{export_size, frame_pixels, layout_frames, ExportPreset, FramePixels};
pub use raster::{decode, encode_png, png_data_url};
