//! Coordinate remapping from image pixels onto the drawing surface.
//!
//! The consuming app draws the silhouette image into a fixed-size box and
//! overlays the zone paths on it. Source images have a different aspect
//! ratio than that box, so each axis scales independently.

use serde::{Deserialize, Serialize};

use crate::types::{Dimensions, PipelineError, Point, Polyline};

/// Size of the target drawing surface, in its own units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetSurface {
    /// Surface width.
    pub width: f64,
    /// Surface height.
    pub height: f64,
}

impl TargetSurface {
    /// Default surface width.
    pub const DEFAULT_WIDTH: f64 = 200.0;

    /// Default surface height.
    pub const DEFAULT_HEIGHT: f64 = 550.0;

    /// Check that both sides are finite and positive.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] otherwise.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.width) && ok(self.height) {
            Ok(())
        } else {
            Err(PipelineError::InvalidConfig(format!(
                "target surface must be positive, got {} x {}",
                self.width, self.height
            )))
        }
    }

    /// Map a pixel-space point onto the surface:
    /// `(px * width / W, py * height / H)`.
    #[must_use]
    pub fn remap(&self, point: Point, source: Dimensions) -> Point {
        Point::new(
            point.x / f64::from(source.width) * self.width,
            point.y / f64::from(source.height) * self.height,
        )
    }

    /// Remap every vertex of a polyline.
    #[must_use]
    pub fn remap_polyline(&self, polyline: &Polyline, source: Dimensions) -> Polyline {
        polyline.map_points(|p| self.remap(p, source))
    }

    /// Aspect-preserving factor that fits the source width onto the surface
    /// width. Used for marker coordinates, which are measured against the
    /// surface width only.
    #[must_use]
    pub fn uniform_scale(&self, source: Dimensions) -> f64 {
        self.width / f64::from(source.width)
    }
}

impl Default for TargetSurface {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
        }
    }
}
