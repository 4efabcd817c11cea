//! Body-part zones: named rectangles in fractional image coordinates.
//!
//! A zone isolates one body part by intersecting its rectangle with the
//! foreground mask. The rectangles are deliberately generous; the mask
//! does the actual shaping.
//!
//! Zone sets are ordered. The order is the order of the emitted path
//! entries, so it is part of the output format.

use std::collections::HashSet;
use std::fmt;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::mask::{intersect, region_mask};
use crate::types::{Dimensions, PipelineError};

/// A rectangle as fractions of image width and height.
///
/// Serialized as `[x1, y1, x2, y2]`. Invariant: every value is finite and
/// `0 <= x1 < x2 <= 1`, `0 <= y1 < y2 <= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct ZoneRect {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

impl ZoneRect {
    /// Create a validated rectangle.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidZone`] when a coordinate is outside
    /// `[0, 1]`, not finite, or the rectangle is empty.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self, PipelineError> {
        let in_range = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        if ![x1, y1, x2, y2].into_iter().all(in_range) {
            return Err(PipelineError::InvalidZone(format!(
                "coordinates must lie in [0, 1], got [{x1}, {y1}, {x2}, {y2}]"
            )));
        }
        if x1 >= x2 || y1 >= y2 {
            return Err(PipelineError::InvalidZone(format!(
                "rectangle must have x1 < x2 and y1 < y2, got [{x1}, {y1}, {x2}, {y2}]"
            )));
        }
        Ok(Self { x1, y1, x2, y2 })
    }

    /// The fractional corners as `[x1, y1, x2, y2]`.
    #[must_use]
    pub const fn corners(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Scale onto an image of the given size.
    ///
    /// The low edges truncate toward zero. The high edges are inclusive of
    /// the truncated pixel, so the half-open result always satisfies
    /// `0 <= x1 < x2 <= width` and `0 <= y1 < y2 <= height`.
    ///
    /// Returns `None` for a zero-sized image.
    #[must_use]
    pub fn pixel_bounds(&self, dimensions: Dimensions) -> Option<PixelBounds> {
        if dimensions.is_empty() {
            return None;
        }
        let (x1, x2) = axis_bounds(self.x1, self.x2, dimensions.width);
        let (y1, y2) = axis_bounds(self.y1, self.y2, dimensions.height);
        Some(PixelBounds { x1, y1, x2, y2 })
    }
}

impl TryFrom<[f64; 4]> for ZoneRect {
    type Error = PipelineError;

    fn try_from([x1, y1, x2, y2]: [f64; 4]) -> Result<Self, Self::Error> {
        Self::new(x1, y1, x2, y2)
    }
}

impl From<ZoneRect> for [f64; 4] {
    fn from(rect: ZoneRect) -> Self {
        rect.corners()
    }
}

/// Truncating scale of a validated fraction onto `extent` pixels.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale_fraction(fraction: f64, extent: u32) -> u32 {
    // fraction is in [0, 1], so the product is in [0, extent].
    (fraction * f64::from(extent)).floor() as u32
}

fn axis_bounds(lo: f64, hi: f64, extent: u32) -> (u32, u32) {
    let start = scale_fraction(lo, extent).min(extent - 1);
    let end = scale_fraction(hi, extent)
        .saturating_add(1)
        .clamp(start + 1, extent);
    (start, end)
}

/// Half-open pixel rectangle `[x1, x2) x [y1, y2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBounds {
    /// First column inside the rectangle.
    pub x1: u32,
    /// First row inside the rectangle.
    pub y1: u32,
    /// First column past the rectangle.
    pub x2: u32,
    /// First row past the rectangle.
    pub y2: u32,
}

impl PixelBounds {
    /// Whether pixel `(x, y)` lies inside.
    #[must_use]
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x1 && x < self.x2 && y >= self.y1 && y < self.y2
    }
}

/// A named zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Key under which the zone's path is emitted.
    pub name: String,
    /// Fractional rectangle.
    pub rect: ZoneRect,
}

/// An ordered set of zones with unique, non-empty names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Zone>", into = "Vec<Zone>")]
pub struct ZoneSet(Vec<Zone>);

impl ZoneSet {
    /// Create a validated zone set.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidZone`] for an empty or duplicate name.
    pub fn new(zones: Vec<Zone>) -> Result<Self, PipelineError> {
        let mut seen = HashSet::new();
        for zone in &zones {
            if zone.name.is_empty() {
                return Err(PipelineError::InvalidZone(
                    "zone name must not be empty".to_string(),
                ));
            }
            if !seen.insert(zone.name.as_str()) {
                return Err(PipelineError::InvalidZone(format!(
                    "duplicate zone name '{}'",
                    zone.name
                )));
            }
        }
        Ok(Self(zones))
    }

    /// Build a preset from trusted constants.
    fn preset(table: &[(&str, [f64; 4])]) -> Self {
        Self(
            table
                .iter()
                .map(|&(name, [x1, y1, x2, y2])| Zone {
                    name: name.to_string(),
                    rect: ZoneRect { x1, y1, x2, y2 },
                })
                .collect(),
        )
    }

    /// Zones in emission order.
    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.0
    }

    /// Number of zones.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no zones.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<Zone>> for ZoneSet {
    type Error = PipelineError;

    fn try_from(zones: Vec<Zone>) -> Result<Self, Self::Error> {
        Self::new(zones)
    }
}

impl From<ZoneSet> for Vec<Zone> {
    fn from(set: ZoneSet) -> Self {
        set.0
    }
}

/// Silhouette variant. Each has its own zone proportions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    /// Male silhouette.
    Male,
    /// Female silhouette.
    Female,
}

impl Sex {
    /// All variants in artifact order.
    pub const ALL: [Self; 2] = [Self::Male, Self::Female];

    /// Upper-case label used in artifact section headers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
        }
    }

    /// The built-in zone set for this variant.
    ///
    /// Left and right are the person's sides: `*-right` zones sit on the
    /// viewer's left of a front-facing silhouette.
    #[must_use]
    pub fn zones(self) -> ZoneSet {
        match self {
            Self::Male => ZoneSet::preset(MALE_ZONES),
            Self::Female => ZoneSet::preset(FEMALE_ZONES),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Male => "male",
            Self::Female => "female",
        })
    }
}

const MALE_ZONES: &[(&str, [f64; 4])] = &[
    ("neck", [0.35, 0.12, 0.65, 0.18]),
    ("pecho", [0.25, 0.18, 0.75, 0.28]),
    ("waist", [0.30, 0.28, 0.70, 0.38]),
    ("hips", [0.25, 0.38, 0.75, 0.45]),
    ("arm-right", [0.05, 0.20, 0.25, 0.32]),
    ("forearm-right", [0.02, 0.32, 0.22, 0.42]),
    ("thigh-right", [0.15, 0.45, 0.48, 0.65]),
    ("calf-right", [0.12, 0.65, 0.48, 0.85]),
    ("arm-left", [0.75, 0.20, 0.95, 0.32]),
    ("forearm-left", [0.78, 0.32, 0.98, 0.42]),
    ("thigh-left", [0.52, 0.45, 0.85, 0.65]),
    ("calf-left", [0.52, 0.65, 0.88, 0.85]),
];

const FEMALE_ZONES: &[(&str, [f64; 4])] = &[
    ("neck", [0.38, 0.13, 0.62, 0.18]),
    ("pecho", [0.28, 0.18, 0.72, 0.29]),
    ("waist", [0.32, 0.29, 0.68, 0.38]),
    ("hips", [0.25, 0.38, 0.75, 0.48]),
    ("arm-right", [0.08, 0.22, 0.28, 0.33]),
    ("forearm-right", [0.05, 0.33, 0.25, 0.43]),
    ("thigh-right", [0.15, 0.48, 0.48, 0.68]),
    ("calf-right", [0.18, 0.68, 0.48, 0.88]),
    ("arm-left", [0.72, 0.22, 0.92, 0.33]),
    ("forearm-left", [0.75, 0.33, 0.95, 0.43]),
    ("thigh-left", [0.52, 0.48, 0.85, 0.68]),
    ("calf-left", [0.52, 0.68, 0.82, 0.88]),
];

/// Zone sets for both variants, as loaded from a JSON override file.
///
/// A variant missing from the file keeps its built-in preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneSets {
    /// Male zones.
    pub male: ZoneSet,
    /// Female zones.
    pub female: ZoneSet,
}

impl ZoneSets {
    /// The zone set for `sex`.
    #[must_use]
    pub const fn get(&self, sex: Sex) -> &ZoneSet {
        match sex {
            Sex::Male => &self.male,
            Sex::Female => &self.female,
        }
    }
}

impl Default for ZoneSets {
    fn default() -> Self {
        Self {
            male: Sex::Male.zones(),
            female: Sex::Female.zones(),
        }
    }
}

/// The foreground pixels of `foreground` that fall inside `rect`.
///
/// Returns `None` for a zero-sized mask.
#[must_use]
pub fn zone_mask(foreground: &GrayImage, rect: &ZoneRect) -> Option<GrayImage> {
    let dimensions = Dimensions {
        width: foreground.width(),
        height: foreground.height(),
    };
    let bounds = rect.pixel_bounds(dimensions)?;
    Some(intersect(foreground, &region_mask(dimensions, bounds)))
}
