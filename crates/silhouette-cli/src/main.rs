//! silhouette: CLI driver for preparing body-silhouette assets.
//!
//! Subcommands:
//!
//! - `paths`: trace the male and female silhouettes zone by zone and write
//!   the plain-text path artifact (optionally SVG previews too)
//! - `dots`: locate colored marker dots in a reference image
//! - `dims`: print an image's pixel dimensions
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin silhouette -- paths --male m.png --female f.png
//! cargo run --release --bin silhouette -- dots ref.png --strategy connectivity
//! ```
//!
//! Logging goes to stderr through `env_logger` (`RUST_LOG` or `-v`);
//! results go to stdout.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use silhouette_export::{PathRecord, Section, SvgMetadata, render_artifact, to_preview_svg};
use silhouette_pipeline::{
    ClusterStrategy, ColorTarget, Dimensions, Dot, Sex, TargetSurface, TraceConfig, ZoneSets,
};

/// Body-silhouette asset preparation: zone outlines and marker dots.
#[derive(Parser)]
#[command(name = "silhouette", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Trace zone outlines for both silhouettes and write the path artifact.
    Paths(PathsArgs),
    /// Locate marker dots in an image.
    Dots(DotsArgs),
    /// Print image dimensions.
    Dims(DimsArgs),
}

#[derive(Args)]
struct PathsArgs {
    /// Male silhouette image (PNG, JPEG, BMP, WebP).
    #[arg(long)]
    male: PathBuf,

    /// Female silhouette image.
    #[arg(long)]
    female: PathBuf,

    /// Output artifact path. Overwritten if it exists.
    #[arg(short, long, default_value = "paths_utf8.txt")]
    output: PathBuf,

    /// JSON file overriding the built-in zones:
    /// `{"male": [{"name": "neck", "rect": [x1, y1, x2, y2]}, ...], "female": [...]}`.
    #[arg(long)]
    zones: Option<PathBuf>,

    /// Simplification tolerance as a fraction of each outline's perimeter.
    #[arg(long, default_value_t = TraceConfig::DEFAULT_SIMPLIFY_FRACTION)]
    simplify_fraction: f64,

    /// Width of the drawing surface the paths are remapped onto.
    #[arg(long, default_value_t = TargetSurface::DEFAULT_WIDTH)]
    target_width: f64,

    /// Height of the drawing surface the paths are remapped onto.
    #[arg(long, default_value_t = TargetSurface::DEFAULT_HEIGHT)]
    target_height: f64,

    /// Also write `male.svg` and `female.svg` previews into this directory.
    #[arg(long)]
    svg_dir: Option<PathBuf>,
}

#[derive(Args)]
struct DotsArgs {
    /// Path to the input image.
    image_path: PathBuf,

    /// Marker color as `#rrggbb`.
    #[arg(long, default_value = "#f59e0b")]
    color: ColorTarget,

    /// Per-channel tolerance (a channel matches when strictly closer).
    #[arg(long, default_value_t = ColorTarget::DEFAULT_TOLERANCE)]
    tolerance: u8,

    /// Pixel grouping strategy.
    #[arg(long, value_enum)]
    strategy: Strategy,

    /// Absorption radius in pixels for `radius-greedy`.
    #[arg(long, default_value_t = ClusterStrategy::DEFAULT_RADIUS)]
    radius: f64,

    /// Rescale coordinates so the image width maps onto this width.
    #[arg(long)]
    scale_width: Option<f64>,

    /// Output dots as JSON instead of text lines.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct DimsArgs {
    /// Path to the input image.
    image_path: PathBuf,
}

/// Pixel grouping strategy selection.
#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    /// 8-connected components.
    Connectivity,
    /// Greedy grouping within `--radius` of a seed pixel.
    RadiusGreedy,
}

fn read_file(path: &Path) -> Result<Vec<u8>, String> {
    std::fs::read(path).map_err(|e| format!("Error reading {}: {e}", path.display()))
}

fn write_file(path: &Path, contents: &str) -> Result<(), String> {
    std::fs::write(path, contents).map_err(|e| format!("Error writing {}: {e}", path.display()))
}

fn load_zones(path: Option<&Path>) -> Result<ZoneSets, String> {
    let Some(path) = path else {
        return Ok(ZoneSets::default());
    };
    let bytes = read_file(path)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| format!("Error parsing zones from {}: {e}", path.display()))
}

fn run_paths(args: &PathsArgs) -> Result<(), String> {
    let config = TraceConfig {
        simplify_fraction: args.simplify_fraction,
        target: TargetSurface {
            width: args.target_width,
            height: args.target_height,
        },
        ..TraceConfig::default()
    };
    config.validate().map_err(|e| e.to_string())?;
    let zone_sets = load_zones(args.zones.as_deref())?;

    let mut records = Vec::with_capacity(Sex::ALL.len());
    for sex in Sex::ALL {
        let image_path = match sex {
            Sex::Male => &args.male,
            Sex::Female => &args.female,
        };
        let zones = zone_sets.get(sex);
        let image_bytes = read_file(image_path)?;
        let result = silhouette_pipeline::trace_zones(&image_bytes, zones, &config)
            .map_err(|e| format!("Error tracing {}: {e}", image_path.display()))?;

        for zone in zones.zones() {
            if result.zone(&zone.name).is_none() {
                log::warn!("{sex}: zone '{}' has no foreground; omitted", zone.name);
            }
        }

        if let Some(ref dir) = args.svg_dir {
            let title = sex.to_string();
            let desc = format!(
                "simplify fraction {}, surface {}x{}",
                config.simplify_fraction, config.target.width, config.target.height,
            );
            let metadata = SvgMetadata {
                title: Some(&title),
                description: Some(&desc),
            };
            let svg = to_preview_svg(&result, config.target, &metadata);
            let svg_path = dir.join(format!("{sex}.svg"));
            write_file(&svg_path, &svg)?;
            log::info!("wrote preview {}", svg_path.display());
        }

        let record = PathRecord::from_trace(&result).map_err(|e| e.to_string())?;
        records.push((sex, record));
    }

    let sections: Vec<Section<'_>> = records
        .iter()
        .map(|(sex, record)| Section {
            label: sex.label(),
            record,
        })
        .collect();
    write_file(&args.output, &render_artifact(&sections))?;
    println!("Done writing to {}", args.output.display());
    Ok(())
}

/// JSON shape for `dots --json`.
#[derive(Serialize)]
struct DotsOutput {
    dimensions: Dimensions,
    scale: f64,
    dots: Vec<Dot>,
}

fn run_dots(args: &DotsArgs) -> Result<(), String> {
    let strategy = match args.strategy {
        Strategy::Connectivity => ClusterStrategy::Connectivity,
        Strategy::RadiusGreedy => ClusterStrategy::RadiusGreedy {
            radius: args.radius,
        },
    };
    let target = ColorTarget {
        tolerance: args.tolerance,
        ..args.color
    };

    let image_bytes = read_file(&args.image_path)?;
    let report = silhouette_pipeline::find_dots(&image_bytes, target, strategy)
        .map_err(|e| format!("Error detecting dots in {}: {e}", args.image_path.display()))?;

    let scale = match args.scale_width {
        None => 1.0,
        Some(width) => {
            let surface = TargetSurface {
                width,
                ..TargetSurface::default()
            };
            surface.validate().map_err(|e| e.to_string())?;
            surface.uniform_scale(report.dimensions)
        }
    };
    let dots: Vec<Dot> = report.dots.iter().map(|d| d.scaled(scale)).collect();

    if args.json {
        let output = DotsOutput {
            dimensions: report.dimensions,
            scale,
            dots,
        };
        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| format!("Error serializing dots: {e}"))?;
        println!("{json}");
    } else {
        println!("Found {} dots.", dots.len());
        for (i, dot) in dots.iter().enumerate() {
            println!("Dot {i}: x={:.1}, y={:.1}", dot.col, dot.row);
        }
    }
    Ok(())
}

fn run_dims(args: &DimsArgs) -> Result<(), String> {
    let image_bytes = read_file(&args.image_path)?;
    let img = silhouette_pipeline::raster::decode(&image_bytes)
        .map_err(|e| format!("Error decoding {}: {e}", args.image_path.display()))?;
    let dims = silhouette_pipeline::raster::dimensions(&img);
    println!("Dimensions: {}x{}", dims.width, dims.height);
    Ok(())
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match &cli.command {
        Command::Paths(args) => run_paths(args),
        Command::Dots(args) => run_dots(args),
        Command::Dims(args) => run_dims(args),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn paths_defaults_match_library_defaults() {
        let cli =
            Cli::try_parse_from(["silhouette", "paths", "--male", "m.png", "--female", "f.png"])
                .unwrap();
        let Command::Paths(args) = cli.command else {
            unreachable!("parsed a different subcommand");
        };
        assert_eq!(args.output, PathBuf::from("paths_utf8.txt"));
        assert!((args.simplify_fraction - 0.002).abs() < f64::EPSILON);
        assert!((args.target_width - 200.0).abs() < f64::EPSILON);
        assert!((args.target_height - 550.0).abs() < f64::EPSILON);
        assert!(args.zones.is_none());
    }

    #[test]
    fn dots_requires_a_strategy() {
        assert!(Cli::try_parse_from(["silhouette", "dots", "a.png"]).is_err());
        let cli = Cli::try_parse_from([
            "silhouette",
            "dots",
            "a.png",
            "--strategy",
            "radius-greedy",
            "--color",
            "#ff0000",
        ])
        .unwrap();
        let Command::Dots(args) = cli.command else {
            unreachable!("parsed a different subcommand");
        };
        assert_eq!(args.color.rgb, [255, 0, 0]);
        assert_eq!(args.tolerance, 40);
        assert!((args.radius - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bad_color_is_rejected() {
        let result = Cli::try_parse_from([
            "silhouette",
            "dots",
            "a.png",
            "--strategy",
            "connectivity",
            "--color",
            "orange",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn missing_image_is_an_error() {
        let args = DimsArgs {
            image_path: PathBuf::from("/nonexistent/silhouette.png"),
        };
        let err = run_dims(&args).unwrap_err();
        assert!(err.starts_with("Error reading"));
    }
}
