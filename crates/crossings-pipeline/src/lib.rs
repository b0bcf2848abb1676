//! crossings-pipeline: line-intersection detection (sans-IO).
//!
//! Counts junctions in binarised line-art through:
//! grayscale -> binary classification -> strided scan (flood-fill +
//! junction classifier per sample) -> deduplication.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and grids and returns structured data. Reading files and
//! printing results lives in the `crossings` binary.

pub mod binary;
pub mod classify;
pub mod dedup;
pub mod diagnostics;
pub mod flood;
pub mod grayscale;
pub mod overlay;
pub mod scan;
pub mod types;

pub use binary::BinaryImage;
pub use classify::{Extremes, Verdict, are_near, classify_seed, is_junction};
pub use flood::{FloodFill, flood_fill};
pub use types::{Detection, DetectorConfig, Dimensions, FillBound, PipelineError, Pixel};

use image::GrayImage;

/// Run the full detection pipeline on encoded image bytes.
///
/// # Pipeline steps
///
/// 1. Decode image and convert to grayscale
/// 2. Classify every sample (intensity 0 is traversable)
/// 3. Strided scan with flood-fill + junction classification
/// 4. Deduplicate nearby candidates
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails validation.
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is unrecognized.
pub fn process(image_bytes: &[u8], config: &DetectorConfig) -> Result<Detection, PipelineError> {
    config.validate()?;
    let gray = grayscale::decode_grayscale(image_bytes)?;
    detect_gray(&gray, config)
}

/// Run detection on an already-decoded grayscale image.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails validation.
pub fn detect_gray(gray: &GrayImage, config: &DetectorConfig) -> Result<Detection, PipelineError> {
    detect(&BinaryImage::from_gray(gray), config)
}

/// Run the scan and deduplication stages on a classified grid.
///
/// An empty grid performs no samples and yields a zero count.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails validation.
pub fn detect(image: &BinaryImage, config: &DetectorConfig) -> Result<Detection, PipelineError> {
    config.validate()?;

    let candidates = scan::scan(image, config);
    let suppressed = dedup::deduplicate(&candidates, config.similarity_threshold);
    let intersections = dedup::kept(&candidates, &suppressed);

    tracing::info!(
        rows = image.rows(),
        columns = image.columns(),
        candidates = candidates.len(),
        intersections = intersections.len(),
        "detection finished"
    );

    Ok(Detection {
        count: intersections.len(),
        intersections,
        candidates,
        suppressed,
        dimensions: image.dimensions(),
    })
}
