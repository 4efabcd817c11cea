//! silhouette-pipeline: Silhouette zone tracing and marker detection (sans-IO).
//!
//! Converts a body-silhouette image into one simplified outline per body
//! zone through:
//! decode -> foreground mask -> zone clip -> largest external contour ->
//! simplification -> remap onto the drawing surface.
//!
//! Also locates colored marker dots in reference images.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data. Filesystem interaction lives
//! in the `silhouette` binary.

pub mod contour;
pub mod dots;
pub mod mask;
pub mod raster;
pub mod remap;
pub mod simplify;
pub mod types;
pub mod zone;

pub use contour::{ContourSelector, ContourSelectorKind};
pub use dots::{ClusterStrategy, Clusterer, ColorTarget, Dot, DotReport, detect_dots};
pub use mask::MaskConfig;
pub use remap::TargetSurface;
pub use types::{Dimensions, DynamicImage, GrayImage, PipelineError, Point, Polyline};
pub use zone::{Sex, Zone, ZoneRect, ZoneSet, ZoneSets};

use serde::{Deserialize, Serialize};

/// Tuning for [`trace_zones`] and [`trace_image`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceConfig {
    /// Foreground thresholds.
    pub mask: MaskConfig,
    /// Which contour of a zone becomes its outline.
    pub contour_selector: ContourSelectorKind,
    /// Simplification tolerance as a fraction of each outline's perimeter.
    pub simplify_fraction: f64,
    /// Coordinate space of the emitted polygons.
    pub target: TargetSurface,
}

impl TraceConfig {
    /// Default simplification fraction.
    pub const DEFAULT_SIMPLIFY_FRACTION: f64 = simplify::DEFAULT_PERIMETER_FRACTION;

    /// Check parameters that have no meaningful out-of-range behavior.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] for a non-positive or
    /// non-finite simplification fraction or target surface.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(self.simplify_fraction.is_finite() && self.simplify_fraction > 0.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "simplify fraction must be positive, got {}",
                self.simplify_fraction
            )));
        }
        self.target.validate()
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            mask: MaskConfig::default(),
            contour_selector: ContourSelectorKind::default(),
            simplify_fraction: Self::DEFAULT_SIMPLIFY_FRACTION,
            target: TargetSurface::default(),
        }
    }
}

/// One traced zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZonePolygon {
    /// Zone name.
    pub name: String,
    /// Vertex count of the contour before simplification.
    pub contour_points: usize,
    /// Simplified closed outline in target-surface coordinates.
    pub polygon: Polyline,
}

/// Result of tracing one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceResult {
    /// Source image size.
    pub dimensions: Dimensions,
    /// Traced zones in zone-set order. Zones without foreground are absent.
    pub zones: Vec<ZonePolygon>,
}

impl TraceResult {
    /// Look up a traced zone by name.
    #[must_use]
    pub fn zone(&self, name: &str) -> Option<&ZonePolygon> {
        self.zones.iter().find(|z| z.name == name)
    }
}

/// Trace every zone of a silhouette image.
///
/// Takes raw image bytes (PNG, JPEG, BMP, WebP); see [`trace_image`].
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is unrecognized.
/// Returns [`PipelineError::InvalidConfig`] if `config` fails validation.
pub fn trace_zones(
    image_bytes: &[u8],
    zones: &ZoneSet,
    config: &TraceConfig,
) -> Result<TraceResult, PipelineError> {
    config.validate()?;
    let img = raster::decode(image_bytes)?;
    trace_image(&img, zones, config)
}

/// Trace every zone of a decoded silhouette image.
///
/// # Pipeline steps
///
/// 1. Foreground mask (alpha, or inverted luminance threshold)
/// 2. Per zone: clip the mask to the zone rectangle
/// 3. Per zone: select the largest external contour
/// 4. Per zone: Ramer-Douglas-Peucker with a perimeter-relative tolerance
/// 5. Per zone: remap onto the target surface
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] for a zero-sized image.
/// Returns [`PipelineError::InvalidConfig`] if `config` fails validation.
pub fn trace_image(
    img: &DynamicImage,
    zones: &ZoneSet,
    config: &TraceConfig,
) -> Result<TraceResult, PipelineError> {
    config.validate()?;
    let dimensions = raster::dimensions(img);
    if dimensions.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    // 1. Foreground mask.
    let foreground = mask::foreground_mask(img, &config.mask);

    let mut traced = Vec::with_capacity(zones.len());
    for zone in zones.zones() {
        // 2. Zone clip.
        let Some(clipped) = zone::zone_mask(&foreground, &zone.rect) else {
            log::debug!("zone '{}' covers no pixels; skipped", zone.name);
            continue;
        };

        // 3. Contour selection.
        let Some(contour) = config.contour_selector.select(&clipped) else {
            log::debug!("zone '{}' has no foreground; skipped", zone.name);
            continue;
        };

        // 4. Simplification.
        let simplified = simplify::simplify_contour(&contour, config.simplify_fraction);
        log::debug!(
            "zone '{}': {} contour points -> {} vertices",
            zone.name,
            contour.len(),
            simplified.len(),
        );

        // 5. Remap.
        traced.push(ZonePolygon {
            name: zone.name.clone(),
            contour_points: contour.len(),
            polygon: config.target.remap_polyline(&simplified, dimensions),
        });
    }

    log::info!(
        "traced {} of {} zones from {}x{} image",
        traced.len(),
        zones.len(),
        dimensions.width,
        dimensions.height,
    );
    Ok(TraceResult {
        dimensions,
        zones: traced,
    })
}

/// Decode an image and detect its marker dots.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is unrecognized.
/// Returns [`PipelineError::InvalidConfig`] for a non-positive radius.
pub fn find_dots(
    image_bytes: &[u8],
    target: ColorTarget,
    strategy: ClusterStrategy,
) -> Result<DotReport, PipelineError> {
    let img = raster::decode(image_bytes)?;
    let dimensions = raster::dimensions(&img);
    let dots = detect_dots(&img.to_rgb8(), target, strategy)?;
    log::info!(
        "found {} dots in {}x{} image",
        dots.len(),
        dimensions.width,
        dimensions.height,
    );
    Ok(DotReport { dimensions, dots })
}
