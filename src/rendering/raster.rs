//! Raster capability: bytes <-> RGBA buffers.
//!
//! Stills are always stored as PNG so the alpha channel written by the
//! chroma key survives the round trip.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::error::{BoothError, BoothResult};

/// Decode any supported raster format into an RGBA buffer at native size.
pub fn decode(bytes: &[u8]) -> BoothResult<RgbaImage> {
    let image = image::load_from_memory(bytes)?;
    Ok(image.to_rgba8())
}

/// Encode an RGBA buffer as PNG.
pub fn encode_png(image: &RgbaImage) -> BoothResult<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image.clone())
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| BoothError::ImageError(format!("Failed to encode image: {}", e)))?;
    Ok(buffer.into_inner())
}

/// `data:` URL for PNG bytes.
pub fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_png_preserves_alpha() {
        let mut image = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        image.put_pixel(1, 1, Rgba([0, 255, 0, 0]));

        let decoded = decode(&encode_png(&image).unwrap()).unwrap();

        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(1, 1).0, [0, 255, 0, 0]);
        assert_eq!(decoded.get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode(b"not an image"),
            Err(BoothError::ImageError(_))
        ));
    }

    #[test]
    fn test_data_url_prefix() {
        let url = png_data_url(&[1, 2, 3]);
        assert_eq!(url, "data:image/png;base64,AQID");
    }
}
