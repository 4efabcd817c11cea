//! Contour extraction: the outline of a zone's dominant region.
//!
//! This module defines the [`ContourSelector`] trait for pluggable
//! selection rules and the [`ContourSelectorKind`] enum for choosing one
//! at runtime.
//!
//! Zones frequently catch a few stray pixels from a neighbouring limb at
//! their edges. Selection keeps one outline per zone and drops the rest.

use image::{GrayImage, imageops};
use imageproc::contours::{BorderType, find_contours};
use serde::{Deserialize, Serialize};

use crate::types::{Point, Polyline};

/// Selects which contour of a zone mask becomes the zone's outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContourSelectorKind {
    /// The external contour enclosing the largest area.
    ///
    /// External contours are the top-level outer borders found by
    /// Suzuki-Abe border following, enumerated in raster order of their
    /// first pixel. Equal areas keep the earliest contour.
    #[default]
    LargestExternal,
}

/// Trait for contour selection strategies.
///
/// Input: a binary mask (non-zero = foreground).
/// Output: the chosen closed outline, or `None` if the mask is empty.
pub trait ContourSelector {
    /// Select the outline of `mask`.
    fn select(&self, mask: &GrayImage) -> Option<Polyline>;
}

impl ContourSelector for ContourSelectorKind {
    fn select(&self, mask: &GrayImage) -> Option<Polyline> {
        match *self {
            Self::LargestExternal => largest_external(mask),
        }
    }
}

/// All external (outermost) contours of a mask, in enumeration order.
///
/// Border following only starts an outer border after a background pixel,
/// so the mask is traced inside a one-pixel background frame. Regions
/// touching the image edge are then ordinary top-level borders.
#[must_use]
pub fn external_contours(mask: &GrayImage) -> Vec<Polyline> {
    let mut framed = GrayImage::new(mask.width() + 2, mask.height() + 2);
    imageops::replace(&mut framed, mask, 1, 1);

    find_contours::<u32>(&framed)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|c| {
            Polyline::new(
                c.points
                    .into_iter()
                    .map(|p| {
                        Point::new(
                            f64::from(p.x.saturating_sub(1)),
                            f64::from(p.y.saturating_sub(1)),
                        )
                    })
                    .collect(),
            )
        })
        .collect()
}

/// Absolute area enclosed by a closed polyline (shoelace formula).
#[must_use]
pub fn enclosed_area(polyline: &Polyline) -> f64 {
    let points = polyline.points();
    if points.len() < 3 {
        return 0.0;
    }
    let twice_signed: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x.mul_add(b.y, -(b.x * a.y)))
        .sum();
    twice_signed.abs() / 2.0
}

fn largest_external(mask: &GrayImage) -> Option<Polyline> {
    let mut best: Option<(f64, Polyline)> = None;
    for contour in external_contours(mask) {
        let area = enclosed_area(&contour);
        // Strictly greater: the first of equal contours wins.
        if best.as_ref().is_none_or(|(best_area, _)| area > *best_area) {
            best = Some((area, contour));
        }
    }
    best.map(|(_, contour)| contour)
}
