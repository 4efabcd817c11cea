//! Shared types for the silhouette tracing pipeline.

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can handle binary masks
/// without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `DynamicImage` so callers can hand an already-decoded image
/// to [`crate::trace_image`].
pub use image::DynamicImage;

/// A 2D point. Pixel space (origin top-left) until remapped onto a
/// [`TargetSurface`](crate::remap::TargetSurface).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// An ordered point sequence.
///
/// Contours and simplified polygons are stored as closed loops: the edge
/// from the last point back to the first is implicit and never repeated
/// in the vector.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// First point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// All points as a slice.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the polyline and returns its points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }

    /// Apply `f` to every point, preserving order.
    #[must_use]
    pub fn map_points(&self, f: impl Fn(Point) -> Point) -> Self {
        Self(self.0.iter().copied().map(f).collect())
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Returns `true` when either side is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Errors produced by the pipeline.
///
/// Empty results (a zone with no foreground, an image with no marker
/// pixels) are not errors; they surface as absent entries or empty vectors.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// A zone definition violates its invariants.
    #[error("invalid zone definition: {0}")]
    InvalidZone(String),

    /// A tracing or detection parameter is out of range.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}
