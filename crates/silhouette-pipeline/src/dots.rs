//! Marker dot detection.
//!
//! Reference images mark anchor positions with small dots of a known
//! color. Detection masks pixels close to that color, groups them into
//! clusters, and reports each cluster's centroid.
//!
//! Two grouping rules exist and they are not equivalent: two dots that are
//! closer than the radius but not touching are one cluster under
//! [`ClusterStrategy::RadiusGreedy`] and two under
//! [`ClusterStrategy::Connectivity`]. There is no default; callers pick.

use std::collections::HashMap;
use std::str::FromStr;

use image::{GrayImage, Luma, RgbImage};
use imageproc::region_labelling::{Connectivity, connected_components};
use serde::{Deserialize, Serialize};

use crate::mask::{BACKGROUND, color_mask};
use crate::types::{Dimensions, PipelineError, Point};

/// A color to match and the per-channel tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorTarget {
    /// Target red, green, blue.
    pub rgb: [u8; 3],
    /// A channel matches when it differs from the target by strictly less
    /// than this.
    pub tolerance: u8,
}

impl ColorTarget {
    /// The orange used for anchor markers (`#f59e0b`).
    pub const MARKER_ORANGE: [u8; 3] = [245, 158, 11];

    /// Default per-channel tolerance.
    pub const DEFAULT_TOLERANCE: u8 = 40;

    /// Whether `pixel` matches on every channel.
    #[must_use]
    pub fn matches(&self, pixel: [u8; 3]) -> bool {
        pixel
            .iter()
            .zip(&self.rgb)
            .all(|(&p, &t)| p.abs_diff(t) < self.tolerance)
    }
}

impl Default for ColorTarget {
    fn default() -> Self {
        Self {
            rgb: Self::MARKER_ORANGE,
            tolerance: Self::DEFAULT_TOLERANCE,
        }
    }
}

impl FromStr for ColorTarget {
    type Err = PipelineError;

    /// Parse `#rrggbb` with the default tolerance.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self {
            rgb: parse_hex_color(s)?,
            tolerance: Self::DEFAULT_TOLERANCE,
        })
    }
}

/// Parse `#rrggbb` (leading `#` optional).
fn parse_hex_color(s: &str) -> Result<[u8; 3], PipelineError> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    let invalid = || PipelineError::InvalidConfig(format!("expected a #rrggbb color, got '{s}'"));
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

/// How matching pixels are grouped into dots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterStrategy {
    /// 8-connected components of the color mask.
    Connectivity,
    /// Greedy grouping around seeds.
    ///
    /// The first remaining matching pixel in row-major order seeds a
    /// cluster that absorbs every remaining pixel closer than `radius`.
    /// Repeats until no pixels remain.
    RadiusGreedy {
        /// Absorption radius in pixels.
        radius: f64,
    },
}

impl ClusterStrategy {
    /// Default radius for [`ClusterStrategy::RadiusGreedy`].
    pub const DEFAULT_RADIUS: f64 = 15.0;

    fn validate(&self) -> Result<(), PipelineError> {
        match *self {
            Self::Connectivity => Ok(()),
            Self::RadiusGreedy { radius } if radius.is_finite() && radius > 0.0 => Ok(()),
            Self::RadiusGreedy { radius } => Err(PipelineError::InvalidConfig(format!(
                "cluster radius must be positive, got {radius}"
            ))),
        }
    }
}

/// Running sums of one cluster's pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cluster {
    sum_x: u64,
    sum_y: u64,
    count: u64,
}

impl Cluster {
    fn add(&mut self, x: u32, y: u32) {
        self.sum_x += u64::from(x);
        self.sum_y += u64::from(y);
        self.count += 1;
    }

    /// Mean pixel position, or `None` for an empty cluster.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn centroid(&self) -> Option<Dot> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        Some(Dot {
            row: self.sum_y as f64 / n,
            col: self.sum_x as f64 / n,
        })
    }
}

/// Trait for pixel grouping strategies.
///
/// Input: a binary mask (non-zero = matching pixel).
/// Output: one [`Cluster`] per detected dot, in no particular order.
pub trait Clusterer {
    /// Group the mask's foreground pixels.
    fn cluster(&self, mask: &GrayImage) -> Vec<Cluster>;
}

impl Clusterer for ClusterStrategy {
    fn cluster(&self, mask: &GrayImage) -> Vec<Cluster> {
        match *self {
            Self::Connectivity => cluster_connected(mask),
            Self::RadiusGreedy { radius } => cluster_radius_greedy(mask, radius),
        }
    }
}

fn cluster_connected(mask: &GrayImage) -> Vec<Cluster> {
    let labels = connected_components(mask, Connectivity::Eight, Luma([BACKGROUND]));
    let mut index: HashMap<u32, usize> = HashMap::new();
    let mut clusters: Vec<Cluster> = Vec::new();
    for (x, y, label) in labels.enumerate_pixels() {
        let label = label.0[0];
        if label == 0 {
            continue;
        }
        let slot = *index.entry(label).or_insert_with(|| {
            clusters.push(Cluster::default());
            clusters.len() - 1
        });
        clusters[slot].add(x, y);
    }
    clusters
}

fn cluster_radius_greedy(mask: &GrayImage, radius: f64) -> Vec<Cluster> {
    let radius_sq = radius * radius;
    let mut pool: Vec<(u32, u32)> = mask
        .enumerate_pixels()
        .filter(|(_, _, p)| p.0[0] != BACKGROUND)
        .map(|(x, y, _)| (x, y))
        .collect();

    let mut clusters = Vec::new();
    while let Some(&(sx, sy)) = pool.first() {
        let seed = Point::new(f64::from(sx), f64::from(sy));
        let (members, rest): (Vec<_>, Vec<_>) = pool.into_iter().partition(|&(x, y)| {
            Point::new(f64::from(x), f64::from(y)).distance_squared(seed) < radius_sq
        });
        let mut cluster = Cluster::default();
        for (x, y) in members {
            cluster.add(x, y);
        }
        clusters.push(cluster);
        pool = rest;
    }
    clusters
}

/// A detected marker centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dot {
    /// Vertical position (mean row).
    pub row: f64,
    /// Horizontal position (mean column).
    pub col: f64,
}

impl Dot {
    /// The dot as an `(x, y)` point.
    #[must_use]
    pub const fn to_point(self) -> Point {
        Point::new(self.col, self.row)
    }

    /// Both coordinates multiplied by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            row: self.row * factor,
            col: self.col * factor,
        }
    }
}

/// Dots found in one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DotReport {
    /// Source image size.
    pub dimensions: Dimensions,
    /// Dot centres sorted by row, then column.
    pub dots: Vec<Dot>,
}

/// Detect marker dots in an RGB image.
///
/// Dots are sorted by row, then by column. No matching pixels yields an
/// empty vector.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] for a non-positive radius.
pub fn detect_dots(
    img: &RgbImage,
    target: ColorTarget,
    strategy: ClusterStrategy,
) -> Result<Vec<Dot>, PipelineError> {
    strategy.validate()?;

    let mask = color_mask(img, target);
    let mut dots: Vec<Dot> = strategy
        .cluster(&mask)
        .iter()
        .filter_map(Cluster::centroid)
        .collect();
    dots.sort_by(|a, b| a.row.total_cmp(&b.row).then(a.col.total_cmp(&b.col)));

    log::debug!("{strategy:?} grouped marker pixels into {} dots", dots.len());
    Ok(dots)
}
