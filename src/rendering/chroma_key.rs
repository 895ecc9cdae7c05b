//! Green-screen removal.
//!
//! A pixel is keyed out when green is bright and dominates both other
//! channels. Keyed pixels get alpha 0, everything else is left untouched.
//! No smoothing, no edge feathering: the output depends on each pixel alone.

use image::RgbaImage;

use super::raster;
use crate::error::{BoothError, BoothResult};

/// Green must exceed this to be keyed.
pub const GREEN_FLOOR: u8 = 80;

/// Green must exceed red and blue by more than this.
pub const CHANNEL_MARGIN: u16 = 30;

/// Whether a pixel belongs to the green background.
#[inline]
pub fn is_key_pixel(r: u8, g: u8, b: u8) -> bool {
    let g16 = g as u16;
    g > GREEN_FLOOR && g16 > r as u16 + CHANNEL_MARGIN && g16 > b as u16 + CHANNEL_MARGIN
}

/// Key out the background in place. Returns the number of pixels cleared.
pub fn apply_chroma_key(image: &mut RgbaImage) -> usize {
    let mut keyed = 0;
    for px in image.pixels_mut() {
        let [r, g, b, _] = px.0;
        if is_key_pixel(r, g, b) {
            px.0[3] = 0;
            keyed += 1;
        }
    }
    keyed
}

/// Decode a still, key it and re-encode as PNG.
///
/// Any failure is a `CompositingFailed`; the input is never handed back.
pub fn chroma_key_png(bytes: &[u8]) -> BoothResult<Vec<u8>> {
    let mut image = raster::decode(bytes)
        .map_err(|e| BoothError::CompositingFailed(format!("decode: {}", e)))?;

    let keyed = apply_chroma_key(&mut image);
    log::debug!(
        "[CHROMA_KEY] Keyed {} of {} pixels ({}x{})",
        keyed,
        image.width() as usize * image.height() as usize,
        image.width(),
        image.height()
    );

    raster::encode_png(&image).map_err(|e| BoothError::CompositingFailed(format!("encode: {}", e)))
}
