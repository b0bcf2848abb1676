//! Detection diagnostics: timing and counts for each pipeline stage.
//!
//! Timestamps come from a caller-supplied [`Clock`], keeping this crate
//! free of platform time sources. Durations are serialized as fractional
//! seconds (`f64`) for JSON compatibility, since `std::time::Duration`
//! does not implement serde traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::binary::BinaryImage;
use crate::types::{Detection, DetectorConfig, FillBound, PipelineError};
use crate::{dedup, grayscale, scan};

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// Capture the current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single detection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionDiagnostics {
    /// Stage 0: image decoding and grayscale conversion.
    pub decode: StageDiagnostics,
    /// Stage 1: binary classification.
    pub binarize: StageDiagnostics,
    /// Stage 2: strided candidate scan.
    pub scan: StageDiagnostics,
    /// Stage 3: candidate deduplication.
    pub dedup: StageDiagnostics,
    /// Total wall-clock duration of the run (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: DetectionSummary,
}

/// Diagnostics for a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding metrics.
    Decode {
        /// Size of the input image bytes.
        input_bytes: usize,
        /// Decoded image width in pixels.
        width: u32,
        /// Decoded image height in pixels.
        height: u32,
    },
    /// Binary classification metrics.
    Binarize {
        /// Grid rows.
        rows: usize,
        /// Grid columns.
        columns: usize,
        /// Pixels classified traversable (intensity 0).
        background_pixels: usize,
        /// Pixels classified stroke.
        stroke_pixels: usize,
    },
    /// Candidate scan metrics.
    Scan {
        /// Sampling stride.
        step: usize,
        /// Extra rows skipped per hit.
        row_jump: usize,
        /// Flood-fill bound in use.
        fill: String,
        /// Raw candidates produced.
        candidate_count: usize,
    },
    /// Deduplication metrics.
    Dedup {
        /// Per-axis similarity threshold.
        threshold: usize,
        /// Candidates suppressed as duplicates.
        suppressed_count: usize,
        /// Candidates kept.
        kept_count: usize,
    },
}

/// High-level summary counts for the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionSummary {
    /// Grid rows.
    pub rows: usize,
    /// Grid columns.
    pub columns: usize,
    /// Raw candidates before deduplication.
    pub candidate_count: usize,
    /// Final intersection count.
    pub intersection_count: usize,
}

/// Decode `image_bytes` and run detection, timing every stage.
///
/// The classified image is returned alongside the detection so callers
/// that render it do not decode the input a second time.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails validation,
/// and the decode errors of [`grayscale::decode_grayscale`].
pub fn detect_with_diagnostics<C: Clock>(
    image_bytes: &[u8],
    config: &DetectorConfig,
    clock: &C,
) -> Result<(BinaryImage, Detection, DetectionDiagnostics), PipelineError> {
    config.validate()?;
    let run_start = clock.now();

    let start = clock.now();
    let gray = grayscale::decode_grayscale(image_bytes)?;
    let decode = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Decode {
            input_bytes: image_bytes.len(),
            width: gray.width(),
            height: gray.height(),
        },
    };

    let start = clock.now();
    let image = BinaryImage::from_gray(&gray);
    let background_pixels = image.background_count();
    let dimensions = image.dimensions();
    let binarize = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Binarize {
            rows: dimensions.rows,
            columns: dimensions.columns,
            background_pixels,
            stroke_pixels: dimensions.area() - background_pixels,
        },
    };

    let start = clock.now();
    let candidates = scan::scan(&image, config);
    let scan = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Scan {
            step: config.step,
            row_jump: config.row_jump,
            fill: describe_fill(config.fill),
            candidate_count: candidates.len(),
        },
    };

    let start = clock.now();
    let suppressed = dedup::deduplicate(&candidates, config.similarity_threshold);
    let intersections = dedup::kept(&candidates, &suppressed);
    let dedup = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Dedup {
            threshold: config.similarity_threshold,
            suppressed_count: candidates.len() - intersections.len(),
            kept_count: intersections.len(),
        },
    };

    let summary = DetectionSummary {
        rows: dimensions.rows,
        columns: dimensions.columns,
        candidate_count: candidates.len(),
        intersection_count: intersections.len(),
    };

    let detection = Detection {
        count: intersections.len(),
        intersections,
        candidates,
        suppressed,
        dimensions,
    };

    let diagnostics = DetectionDiagnostics {
        decode,
        binarize,
        scan,
        dedup,
        total_duration: clock.elapsed(&run_start),
        summary,
    };

    Ok((image, detection, diagnostics))
}

impl DetectionDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Detection Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {} rows x {} columns",
            self.summary.rows, self.summary.columns,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Decode", &self.decode),
            ("Binarize", &self.binarize),
            ("Scan", &self.scan),
            ("Dedup", &self.dedup),
        ];

        for (name, diag) in stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Candidates: {}  |  Intersections: {}",
            self.summary.candidate_count, self.summary.intersection_count,
        ));

        lines.join("\n")
    }
}

/// Short label for a fill bound.
fn describe_fill(fill: FillBound) -> String {
    match fill {
        FillBound::Exhaustive => "exhaustive".to_string(),
        FillBound::Sampled {
            min_visits,
            max_visits,
        } => format!("sampled({min_visits}..{max_visits})"),
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::Binarize {
            rows,
            columns,
            background_pixels,
            stroke_pixels,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let density = if rows * columns > 0 {
                *stroke_pixels as f64 / (rows * columns) as f64 * 100.0
            } else {
                0.0
            };
            format!("background={background_pixels} stroke={stroke_pixels} ({density:.1}%)")
        }
        StageMetrics::Scan {
            step,
            row_jump,
            fill,
            candidate_count,
        } => format!("step={step} jump={row_jump} fill={fill} candidates={candidate_count}"),
        StageMetrics::Dedup {
            threshold,
            suppressed_count,
            kept_count,
        } => format!("threshold={threshold} suppressed={suppressed_count} kept={kept_count}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;

    /// Clock that advances one millisecond per reading.
    struct TickClock(Cell<u64>);

    impl Clock for TickClock {
        type Instant = u64;

        fn now(&self) -> u64 {
            let t = self.0.get();
            self.0.set(t + 1);
            t
        }

        fn elapsed(&self, since: &u64) -> Duration {
            Duration::from_millis(self.0.get() - since)
        }
    }

    fn encode_png(img: &image::GrayImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::L8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn duration_ms_converts_correctly() {
        let d = Duration::from_millis(1234);
        assert!((duration_ms(d) - 1234.0).abs() < 0.01);
    }

    #[test]
    fn describe_fill_labels() {
        assert_eq!(describe_fill(FillBound::Exhaustive), "exhaustive");
        assert_eq!(describe_fill(FillBound::DEFAULT_SAMPLED), "sampled(200..400)");
    }

    #[test]
    fn diagnostics_match_detection() {
        let img = image::GrayImage::from_fn(20, 10, |x, _| image::Luma([if x < 5 { 255 } else { 0 }]));
        let png = encode_png(&img);
        let clock = TickClock(Cell::new(0));
        let (image, detection, diag) =
            detect_with_diagnostics(&png, &DetectorConfig::default(), &clock).unwrap();
        assert_eq!(image, BinaryImage::from_gray(&img));

        assert_eq!(diag.summary.rows, 10);
        assert_eq!(diag.summary.columns, 20);
        assert_eq!(diag.summary.intersection_count, detection.count);
        assert_eq!(diag.summary.candidate_count, detection.candidates.len());
        assert!(matches!(
            diag.binarize.metrics,
            StageMetrics::Binarize {
                background_pixels: 150,
                stroke_pixels: 50,
                ..
            }
        ));
        assert!(diag.total_duration >= diag.scan.duration);
    }

    #[test]
    fn diagnostics_reject_invalid_config() {
        let config = DetectorConfig {
            step: 0,
            ..DetectorConfig::default()
        };
        let clock = TickClock(Cell::new(0));
        let result = detect_with_diagnostics(&[1, 2, 3], &config, &clock);
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn report_produces_table() {
        let stage = |ms, metrics| StageDiagnostics {
            duration: Duration::from_millis(ms),
            metrics,
        };
        let diag = DetectionDiagnostics {
            decode: stage(
                4,
                StageMetrics::Decode {
                    input_bytes: 1000,
                    width: 100,
                    height: 80,
                },
            ),
            binarize: stage(
                1,
                StageMetrics::Binarize {
                    rows: 80,
                    columns: 100,
                    background_pixels: 7000,
                    stroke_pixels: 1000,
                },
            ),
            scan: stage(
                20,
                StageMetrics::Scan {
                    step: 5,
                    row_jump: 20,
                    fill: "sampled(200..400)".to_string(),
                    candidate_count: 6,
                },
            ),
            dedup: stage(
                1,
                StageMetrics::Dedup {
                    threshold: 5,
                    suppressed_count: 2,
                    kept_count: 4,
                },
            ),
            total_duration: Duration::from_millis(26),
            summary: DetectionSummary {
                rows: 80,
                columns: 100,
                candidate_count: 6,
                intersection_count: 4,
            },
        };

        let report = diag.report();
        assert!(report.contains("Detection Diagnostics Report"));
        assert!(report.contains("Image: 80 rows x 100 columns"));
        assert!(report.contains("stroke=1000 (12.5%)"));
        assert!(report.contains("Candidates: 6  |  Intersections: 4"));
    }

    #[test]
    fn diagnostics_serde_round_trip() {
        let img = image::GrayImage::new(8, 8);
        let clock = TickClock(Cell::new(0));
        let (_, _, diag) =
            detect_with_diagnostics(&encode_png(&img), &DetectorConfig::default(), &clock).unwrap();
        let json = serde_json::to_string(&diag).unwrap();
        let back: DetectionDiagnostics = serde_json::from_str(&json).unwrap();
        assert_eq!(back.summary.rows, 8);
        assert_eq!(back.summary.intersection_count, diag.summary.intersection_count);
    }
}
