//! Binary masks: foreground extraction, rectangular regions, color matching.
//!
//! Every mask is a [`GrayImage`] holding only [`BACKGROUND`] (0) and
//! [`FOREGROUND`] (255), which is the form `imageproc` contour tracing and
//! component labelling expect.

use image::{DynamicImage, GrayImage, Luma, RgbImage};
use serde::{Deserialize, Serialize};

use crate::dots::ColorTarget;
use crate::types::Dimensions;
use crate::zone::PixelBounds;

/// Mask value for background pixels.
pub const BACKGROUND: u8 = 0;

/// Mask value for foreground pixels.
pub const FOREGROUND: u8 = 255;

/// Thresholds for deriving the foreground mask from a silhouette image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskConfig {
    /// Pixels with alpha strictly above this value are foreground
    /// (images with an alpha channel only).
    pub alpha_cutoff: u8,

    /// Pixels with luminance at or below this value are foreground
    /// (opaque images only; near-white is treated as background).
    pub luma_cutoff: u8,
}

impl MaskConfig {
    /// Default alpha cutoff.
    pub const DEFAULT_ALPHA_CUTOFF: u8 = 10;

    /// Default luminance cutoff.
    pub const DEFAULT_LUMA_CUTOFF: u8 = 240;
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            alpha_cutoff: Self::DEFAULT_ALPHA_CUTOFF,
            luma_cutoff: Self::DEFAULT_LUMA_CUTOFF,
        }
    }
}

const fn binary(on: bool) -> Luma<u8> {
    if on {
        Luma([FOREGROUND])
    } else {
        Luma([BACKGROUND])
    }
}

/// BT.601 luma in 14-bit fixed point, rounded to nearest.
///
/// Not `to_luma8`, which weights channels per Rec. 709.
fn bt601_luma([r, g, b]: [u8; 3]) -> u8 {
    let y = (u32::from(r) * 4899 + u32::from(g) * 9617 + u32::from(b) * 1868 + 8192) >> 14;
    u8::try_from(y).unwrap_or(u8::MAX)
}

/// Build the body foreground mask.
///
/// Uses the alpha channel when the image has one, otherwise inverts a
/// BT.601 luminance threshold so that a light background drops out.
#[must_use = "returns the foreground mask"]
pub fn foreground_mask(img: &DynamicImage, config: &MaskConfig) -> GrayImage {
    if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            binary(rgba.get_pixel(x, y).0[3] > config.alpha_cutoff)
        })
    } else {
        let rgb = img.to_rgb8();
        GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
            binary(bt601_luma(rgb.get_pixel(x, y).0) <= config.luma_cutoff)
        })
    }
}

/// A mask that is foreground exactly inside `bounds`.
#[must_use = "returns the region mask"]
pub fn region_mask(dimensions: Dimensions, bounds: PixelBounds) -> GrayImage {
    GrayImage::from_fn(dimensions.width, dimensions.height, |x, y| {
        binary(bounds.contains(x, y))
    })
}

/// Pixel-wise logical AND of two masks of equal size.
#[must_use = "returns the intersected mask"]
pub fn intersect(a: &GrayImage, b: &GrayImage) -> GrayImage {
    debug_assert_eq!(a.dimensions(), b.dimensions(), "mask sizes differ");
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        binary(a.get_pixel(x, y).0[0] != BACKGROUND && b.get_pixel(x, y).0[0] != BACKGROUND)
    })
}

/// Mask of pixels whose every channel is strictly within `target.tolerance`
/// of the target color.
#[must_use = "returns the color mask"]
pub fn color_mask(img: &RgbImage, target: ColorTarget) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        binary(target.matches(img.get_pixel(x, y).0))
    })
}

/// Number of foreground pixels in a mask.
#[must_use]
pub fn count_foreground(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p.0[0] != BACKGROUND).count()
}
