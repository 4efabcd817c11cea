//! Image decoding.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and produces a decoded
//! image with its channel layout intact. The alpha channel, when present,
//! drives the foreground mask, so nothing is converted here.

use image::DynamicImage;

use crate::types::{Dimensions, PipelineError};

/// Decode raw image bytes.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    Ok(image::load_from_memory(bytes)?)
}

/// Pixel dimensions of a decoded image.
#[must_use]
pub fn dimensions(img: &DynamicImage) -> Dimensions {
    Dimensions {
        width: img.width(),
        height: img.height(),
    }
}

/// Encode an RGBA image as PNG bytes. Test helper shared across modules.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) fn encode_png(img: &image::RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::ImageEncoder::write_image(
        encoder,
        img.as_raw(),
        img.width(),
        img.height(),
        image::ExtendedColorType::Rgba8,
    )
    .unwrap();
    buf
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_returns_error() {
        assert!(matches!(decode(&[]), Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_image_decode_error() {
        let result = decode(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn rgba_png_keeps_alpha_channel() {
        let img = image::RgbaImage::from_fn(3, 2, |x, _| {
            image::Rgba([0, 0, 0, u8::try_from(x * 100).unwrap()])
        });
        let decoded = decode(&encode_png(&img)).unwrap();
        assert!(decoded.color().has_alpha());
        assert_eq!(decoded.to_rgba8().get_pixel(2, 1).0[3], 200);
    }

    #[test]
    fn dimensions_match_input() {
        let img = image::RgbaImage::from_pixel(17, 31, image::Rgba([128, 64, 32, 255]));
        let decoded = decode(&encode_png(&img)).unwrap();
        assert_eq!(
            dimensions(&decoded),
            Dimensions {
                width: 17,
                height: 31
            }
        );
    }
}
