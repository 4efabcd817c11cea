//! silhouette-export: Pure format serializers (sans-IO)
//!
//! Converts traced zones into output formats: SVG path strings, the
//! plain-text path artifact, and an SVG preview document.

pub mod paths;
pub mod svg;

pub use paths::{ExportError, PathRecord, Section, build_path_data, render_artifact};
pub use svg::{SvgMetadata, to_preview_svg};
