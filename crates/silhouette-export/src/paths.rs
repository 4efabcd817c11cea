//! Path strings and the plain-text path artifact.
//!
//! Each traced zone becomes an SVG path string of the form
//! `M x,y L x,y ... Z` with coordinates at one decimal place. The artifact
//! groups those strings under one header per silhouette variant so they
//! can be pasted into application source.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use std::fmt::Write;

use silhouette_pipeline::{Polyline, TraceResult};

/// Errors produced while assembling export records.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Two entries in one record share a zone name.
    #[error("duplicate zone '{0}' in path record")]
    DuplicateZone(String),
}

/// Build a closed SVG path `d` string from a polygon.
///
/// Uses `M` for the first vertex, `L` for the rest and `Z` to close.
/// Coordinates are printed with one decimal place. Returns an empty string
/// for an empty polygon.
///
/// # Examples
///
/// ```
/// use silhouette_pipeline::{Point, Polyline};
/// use silhouette_export::build_path_data;
///
/// let polygon = Polyline::new(vec![
///     Point::new(10.0, 20.0),
///     Point::new(30.27, 40.0),
///     Point::new(10.0, 40.0),
/// ]);
/// assert_eq!(build_path_data(&polygon), "M 10.0,20.0 L 30.3,40.0 L 10.0,40.0 Z");
/// ```
#[must_use]
pub fn build_path_data(polygon: &Polyline) -> String {
    let points = polygon.points();
    if points.is_empty() {
        return String::new();
    }

    let mut data = String::with_capacity(points.len() * 14 + 2);
    for (i, p) in points.iter().enumerate() {
        let cmd = if i == 0 { "M" } else { " L" };
        let _ = write!(data, "{cmd} {:.1},{:.1}", p.x, p.y);
    }
    data.push_str(" Z");
    data
}

/// Zone name to path string, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathRecord {
    entries: Vec<(String, String)>,
}

impl PathRecord {
    /// Create an empty record.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::DuplicateZone`] if `name` is already present;
    /// the record is left unchanged.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Result<(), ExportError> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(ExportError::DuplicateZone(name));
        }
        self.entries.push((name, path.into()));
        Ok(())
    }

    /// One entry per traced zone, in trace order.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::DuplicateZone`] if two zones share a name.
    pub fn from_trace(result: &TraceResult) -> Result<Self, ExportError> {
        let mut record = Self::new();
        for zone in &result.zones {
            record.insert(zone.name.as_str(), build_path_data(&zone.polygon))?;
        }
        Ok(record)
    }

    /// The path string for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, p)| (n.as_str(), p.as_str()))
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One labelled block of the artifact.
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    /// Header label, e.g. `MALE`.
    pub label: &'a str,
    /// Entries listed under the header.
    pub record: &'a PathRecord,
}

/// Render the text artifact.
///
/// ```text
/// --- MALE PATHS ---
/// neck: "M 70.0,66.0 L ... Z",
///
/// --- FEMALE PATHS ---
/// neck: "M 76.0,71.5 L ... Z",
/// ```
///
/// Sections are separated by one blank line. A section with no entries
/// still gets its header.
#[must_use]
pub fn render_artifact(sections: &[Section<'_>]) -> String {
    let mut out = String::new();
    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "--- {} PATHS ---", section.label);
        for (name, path) in section.record.iter() {
            let _ = writeln!(out, "{name}: \"{path}\",");
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use silhouette_pipeline::{Dimensions, Point, ZonePolygon};

    use super::*;

    fn triangle() -> Polyline {
        Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.04, 0.0),
            Point::new(5.0, 8.66),
        ])
    }

    // --- build_path_data ---

    #[test]
    fn build_path_data_empty_polygon() {
        assert_eq!(build_path_data(&Polyline::default()), "");
    }

    #[test]
    fn build_path_data_single_point() {
        let polygon = Polyline::new(vec![Point::new(5.0, 5.0)]);
        assert_eq!(build_path_data(&polygon), "M 5.0,5.0 Z");
    }

    #[test]
    fn build_path_data_rounds_to_one_decimal() {
        assert_eq!(
            build_path_data(&triangle()),
            "M 0.0,0.0 L 10.0,0.0 L 5.0,8.7 Z"
        );
    }

    #[test]
    fn build_path_data_does_not_repeat_first_vertex() {
        let d = build_path_data(&triangle());
        assert_eq!(d.matches('M').count(), 1);
        assert_eq!(d.matches(" L ").count(), 2);
        assert!(d.ends_with("5.0,8.7 Z"));
    }

    // --- PathRecord ---

    #[test]
    fn insert_keeps_order_and_rejects_duplicates() {
        let mut record = PathRecord::new();
        record.insert("neck", "M 1.0,1.0 Z").unwrap();
        record.insert("hips", "M 2.0,2.0 Z").unwrap();
        let err = record.insert("neck", "M 3.0,3.0 Z").unwrap_err();
        assert!(matches!(err, ExportError::DuplicateZone(ref n) if n == "neck"));

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("neck"), Some("M 1.0,1.0 Z"));
        let names: Vec<&str> = record.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["neck", "hips"]);
    }

    #[test]
    fn from_trace_uses_trace_order() {
        let result = TraceResult {
            dimensions: Dimensions {
                width: 10,
                height: 10,
            },
            zones: vec![
                ZonePolygon {
                    name: "waist".to_string(),
                    contour_points: 12,
                    polygon: triangle(),
                },
                ZonePolygon {
                    name: "arm-left".to_string(),
                    contour_points: 3,
                    polygon: Polyline::new(vec![Point::new(1.0, 2.0)]),
                },
            ],
        };
        let record = PathRecord::from_trace(&result).unwrap();
        let entries: Vec<(&str, &str)> = record.iter().collect();
        assert_eq!(
            entries,
            [
                ("waist", "M 0.0,0.0 L 10.0,0.0 L 5.0,8.7 Z"),
                ("arm-left", "M 1.0,2.0 Z"),
            ]
        );
    }

    // --- render_artifact ---

    #[test]
    fn render_artifact_layout() {
        let mut male = PathRecord::new();
        male.insert("neck", "M 1.0,2.0 Z").unwrap();
        male.insert("hips", "M 3.0,4.0 Z").unwrap();
        let mut female = PathRecord::new();
        female.insert("neck", "M 5.0,6.0 Z").unwrap();

        let text = render_artifact(&[
            Section {
                label: "MALE",
                record: &male,
            },
            Section {
                label: "FEMALE",
                record: &female,
            },
        ]);
        assert_eq!(
            text,
            "--- MALE PATHS ---\n\
             neck: \"M 1.0,2.0 Z\",\n\
             hips: \"M 3.0,4.0 Z\",\n\
             \n\
             --- FEMALE PATHS ---\n\
             neck: \"M 5.0,6.0 Z\",\n"
        );
    }

    #[test]
    fn render_artifact_empty_section_keeps_header() {
        let empty = PathRecord::new();
        let text = render_artifact(&[Section {
            label: "MALE",
            record: &empty,
        }]);
        assert_eq!(text, "--- MALE PATHS ---\n");
    }

    #[test]
    fn render_artifact_no_sections() {
        assert_eq!(render_artifact(&[]), "");
    }
}
