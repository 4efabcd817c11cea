//! SVG preview serializer.
//!
//! Renders the traced zones of one image as an SVG document sized to the
//! target surface, using the [`svg`] crate for document construction and
//! XML escaping. Each zone becomes a closed `<path>` whose `id` is the zone
//! name, so the preview can be opened next to the silhouette image to
//! check the outlines line up.
//!
//! Optional [`SvgMetadata`] embeds `<title>` and `<desc>` elements.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::Text;
use svg::node::element::{Description, Path, Rectangle, Title};

use silhouette_pipeline::{TargetSurface, TraceResult};

use crate::paths::build_path_data;

/// Metadata to embed in the SVG document.
///
/// Both fields are optional. When present, a `<title>` and/or `<desc>`
/// element is emitted immediately after the opening `<svg>` tag.
///
/// Text values are XML-escaped automatically by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    ///
    /// Typically the source image filename (without extension).
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    ///
    /// Typically the trace parameters.
    pub description: Option<&'a str>,
}

/// Serialize a trace result into an SVG preview.
///
/// The `viewBox` is `0 0 width height` of `target`, matching the space the
/// zone polygons were remapped into. A light outline of the surface is
/// drawn first, then one `<path>` per zone in trace order. Zones with an
/// empty polygon are skipped.
#[must_use]
pub fn to_preview_svg(
    result: &TraceResult,
    target: TargetSurface,
    metadata: &SvgMetadata<'_>,
) -> String {
    let mut doc = Document::new()
        .set("width", target.width)
        .set("height", target.height)
        .set("viewBox", (0, 0, target.width, target.height));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    let frame = Rectangle::new()
        .set("width", target.width)
        .set("height", target.height)
        .set("fill", "none")
        .set("stroke", "#cccccc")
        .set("stroke-width", 0.5);
    doc = doc.add(frame);

    for zone in &result.zones {
        let d = build_path_data(&zone.polygon);
        if d.is_empty() {
            continue;
        }

        let path = Path::new()
            .set("id", zone.name.as_str())
            .set("d", d)
            .set("fill", "none")
            .set("stroke", "black")
            .set("stroke-width", 1);
        doc = doc.add(path);
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

#[cfg(test)]
mod tests {
    use silhouette_pipeline::{Dimensions, Point, Polyline, ZonePolygon};

    use super::*;

    fn zone(name: &str, points: Vec<Point>) -> ZonePolygon {
        ZonePolygon {
            name: name.to_string(),
            contour_points: points.len(),
            polygon: Polyline::new(points),
        }
    }

    fn result(zones: Vec<ZonePolygon>) -> TraceResult {
        TraceResult {
            dimensions: Dimensions {
                width: 400,
                height: 1100,
            },
            zones,
        }
    }

    fn square() -> Vec<Point> {
        vec![
            Point::new(10.0, 10.0),
            Point::new(20.0, 10.0),
            Point::new(20.0, 20.0),
            Point::new(10.0, 20.0),
        ]
    }

    fn no_meta() -> SvgMetadata<'static> {
        SvgMetadata::default()
    }

    #[test]
    fn document_uses_target_surface() {
        let svg = to_preview_svg(&result(vec![]), TargetSurface::default(), &no_meta());
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("<svg"));
        assert!(svg.contains(r#"width="200""#));
        assert!(svg.contains(r#"height="550""#));
        assert!(svg.contains(r#"viewBox="0 0 200 550""#));
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn one_path_per_zone_with_zone_id() {
        let svg = to_preview_svg(
            &result(vec![zone("neck", square()), zone("hips", square())]),
            TargetSurface::default(),
            &no_meta(),
        );
        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains(r#"id="neck""#));
        assert!(svg.contains(r#"id="hips""#));
        assert!(svg.contains("M 10.0,10.0 L 20.0,10.0 L 20.0,20.0 L 10.0,20.0 Z"));
        assert!(svg.find(r#"id="neck""#).unwrap() < svg.find(r#"id="hips""#).unwrap());
    }

    #[test]
    fn empty_polygons_are_skipped() {
        let svg = to_preview_svg(
            &result(vec![zone("neck", vec![])]),
            TargetSurface::default(),
            &no_meta(),
        );
        assert_eq!(svg.matches("<path").count(), 0);
    }

    #[test]
    fn title_and_desc_are_escaped() {
        let meta = SvgMetadata {
            title: Some("male <front>"),
            description: Some("fraction=0.002 & 200x550"),
        };
        let svg = to_preview_svg(&result(vec![]), TargetSurface::default(), &meta);
        assert!(svg.contains("<title>male &lt;front&gt;</title>"));
        assert!(svg.contains("fraction=0.002 &amp; 200x550"));
        assert!(svg.find("<title>").unwrap() < svg.find("<rect").unwrap());
    }

    #[test]
    fn no_metadata_elements_by_default() {
        let svg = to_preview_svg(&result(vec![]), TargetSurface::default(), &no_meta());
        assert!(!svg.contains("<title>"));
        assert!(!svg.contains("<desc>"));
    }
}
