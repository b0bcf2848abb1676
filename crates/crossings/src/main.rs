//! crossings: print the number of line intersections in a line-art image.
//!
//! Reads an image file, classifies it (intensity 0 is traversable),
//! scans it for junction-shaped strokes and prints the deduplicated
//! count.
//!
//! # Usage
//!
//! ```text
//! crossings [OPTIONS] <IMAGE_PATH>
//! ```
//!
//! Log output goes to stderr and is controlled with `RUST_LOG`
//! (default `warn`).

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{CommandFactory, Parser, ValueEnum};
use crossings_pipeline::diagnostics::{Clock, detect_with_diagnostics};
use crossings_pipeline::overlay::{OverlayOptions, render_overlay};
use crossings_pipeline::{
    BinaryImage, Detection, DetectorConfig, FillBound, PipelineError, grayscale,
};
use tracing_subscriber::EnvFilter;

/// Count line intersections in a black/white line-art image.
///
/// Prints the number of junctions found. Pixels with intensity exactly 0
/// are treated as traversable background; everything else is stroke.
#[derive(Parser)]
#[command(name = "crossings", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: Option<PathBuf>,

    /// Sampling stride in pixels, both axes.
    #[arg(long, default_value_t = DetectorConfig::DEFAULT_STEP, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    step: usize,

    /// Extra rows skipped after a detected junction.
    #[arg(long, default_value_t = DetectorConfig::DEFAULT_ROW_JUMP)]
    row_jump: usize,

    /// Per-axis distance below which two pixels count as the same place.
    #[arg(long, default_value_t = DetectorConfig::DEFAULT_SIMILARITY_THRESHOLD, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    threshold: usize,

    /// Flood-fill bound.
    #[arg(long, value_enum, default_value_t = Fill::Sampled)]
    fill: Fill,

    /// Visits required before a sampled fill may stop.
    #[arg(long, default_value_t = DetectorConfig::DEFAULT_MIN_VISITS)]
    min_visits: usize,

    /// Hard cap on visits of a sampled fill.
    #[arg(long, default_value_t = DetectorConfig::DEFAULT_MAX_VISITS)]
    max_visits: usize,

    /// Full detector config as a JSON string.
    ///
    /// When provided, all other detector flags are ignored. The JSON must
    /// be a valid `DetectorConfig` serialization; missing fields take
    /// their defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Print the full detection as JSON instead of the bare count.
    #[arg(long)]
    json: bool,

    /// Print per-stage timing and counts to stderr.
    #[arg(long)]
    diagnostics: bool,

    /// Write a PNG with the detected intersections circled.
    #[arg(long, value_name = "PATH")]
    overlay: Option<PathBuf>,

    /// Also mark suppressed duplicate candidates in the overlay.
    #[arg(long, requires = "overlay")]
    show_suppressed: bool,

    /// Fail instead of counting zero when the image cannot be read.
    #[arg(long)]
    strict: bool,
}

/// Flood-fill bound selection.
#[derive(Clone, Copy, ValueEnum)]
enum Fill {
    /// Stop once a local neighbourhood has been sampled.
    Sampled,
    /// Flood the whole image from every sample.
    Exhaustive,
}

/// Build a [`DetectorConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual detector flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<DetectorConfig, String> {
    let config = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        DetectorConfig {
            step: cli.step,
            row_jump: cli.row_jump,
            similarity_threshold: cli.threshold,
            fill: match cli.fill {
                Fill::Sampled => FillBound::Sampled {
                    min_visits: cli.min_visits,
                    max_visits: cli.max_visits,
                },
                Fill::Exhaustive => FillBound::Exhaustive,
            },
        }
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// Read the input file.
///
/// Unless `strict` is set, an unreadable file is logged and `None` is
/// returned, so the run reports zero intersections.
fn read_input(path: &Path, strict: bool) -> Result<Option<Vec<u8>>, String> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) => degrade(format!("Error reading {}: {e}", path.display()), strict).map(|_| None),
    }
}

/// Fail with `msg` when `strict`, otherwise log it and fall back to an
/// empty grid.
fn degrade(msg: String, strict: bool) -> Result<BinaryImage, String> {
    if strict {
        return Err(msg);
    }
    tracing::warn!("{msg}; treating it as an empty image");
    Ok(BinaryImage::empty())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let Some(ref image_path) = cli.image_path else {
        println!("You need to give the path of an image file");
        println!("{}", Cli::command().render_usage());
        return ExitCode::from(1);
    };

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(?config, path = %image_path.display(), "starting detection");

    let image_bytes = match read_input(image_path, cli.strict) {
        Ok(bytes) => bytes,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let (image, detection) = match run(&cli, &config, image_path, image_bytes.as_deref()) {
        Ok(result) => result,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(ref overlay_path) = cli.overlay {
        let options = OverlayOptions {
            show_suppressed: cli.show_suppressed,
            ..OverlayOptions::default()
        };
        let canvas = render_overlay(&image, &detection, &options);
        if let Err(e) = canvas.save(overlay_path) {
            eprintln!("Error writing overlay to {}: {e}", overlay_path.display());
            return ExitCode::FAILURE;
        }
        tracing::info!(path = %overlay_path.display(), "overlay written");
    }

    if cli.json {
        match serde_json::to_string_pretty(&detection) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing detection: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", detection.count);
    }

    ExitCode::SUCCESS
}

/// Decode, classify and run detection, with stage diagnostics on stderr
/// when requested.
///
/// `image_bytes` is `None` when the input could not be read. Decoding
/// happens exactly once on every path.
fn run(
    cli: &Cli,
    config: &DetectorConfig,
    path: &Path,
    image_bytes: Option<&[u8]>,
) -> Result<(BinaryImage, Detection), String> {
    let decode_error = |e: PipelineError| format!("Error decoding {}: {e}", path.display());

    let image = match image_bytes {
        None => BinaryImage::empty(),
        Some(bytes) if cli.diagnostics => {
            // Diagnostics time the decode stage too, so they start from the raw bytes.
            match detect_with_diagnostics(bytes, config, &StdClock) {
                Ok((image, detection, diagnostics)) => {
                    eprintln!("{}", diagnostics.report());
                    return Ok((image, detection));
                }
                Err(e) => degrade(decode_error(e), cli.strict)?,
            }
        }
        Some(bytes) => match grayscale::decode_grayscale(bytes) {
            Ok(gray) => BinaryImage::from_gray(&gray),
            Err(e) => degrade(decode_error(e), cli.strict)?,
        },
    };

    let detection =
        crossings_pipeline::detect(&image, config).map_err(|e| format!("Detection error: {e}"))?;
    Ok((image, detection))
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}
