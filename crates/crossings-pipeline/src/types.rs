//! Shared types for the crossings detection pipeline.

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can hand decoded rasters
/// to the pipeline without depending on `image` directly.
pub use image::GrayImage;

/// A pixel position in grid coordinates.
///
/// Rows grow downwards and columns grow to the right, matching the
/// row-major layout of [`BinaryImage`](crate::binary::BinaryImage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pixel {
    /// Row index (pixels from the top edge).
    pub row: usize,
    /// Column index (pixels from the left edge).
    pub col: usize,
}

impl Pixel {
    /// Create a new pixel.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Grid extents in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    /// Number of rows (image height).
    pub rows: usize,
    /// Number of columns (image width).
    pub columns: usize,
}

impl Dimensions {
    /// Total number of samples (`rows * columns`).
    #[must_use]
    pub const fn area(self) -> usize {
        self.rows * self.columns
    }
}

/// How far a single flood-fill is allowed to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FillBound {
    /// Run until the queue drains.
    ///
    /// Every pixel 4-connected to the seed is visited, which on a
    /// rectangular grid means the whole image.
    Exhaustive,

    /// Stop once a local neighbourhood has been sampled.
    ///
    /// Visits are counted per class. The fill keeps going while fewer
    /// than `min_visits` pixels were seen or while background visits are
    /// still outnumbered by stroke visits, and never marks more than
    /// `max_visits` pixels.
    Sampled {
        /// Visits required before background dominance may stop the fill.
        min_visits: usize,
        /// Hard cap on visited pixels.
        max_visits: usize,
    },
}

impl FillBound {
    /// The bounded variant with the default visit limits (200 / 400).
    pub const DEFAULT_SAMPLED: Self = Self::Sampled {
        min_visits: DetectorConfig::DEFAULT_MIN_VISITS,
        max_visits: DetectorConfig::DEFAULT_MAX_VISITS,
    };
}

impl Default for FillBound {
    fn default() -> Self {
        Self::DEFAULT_SAMPLED
    }
}

/// Configuration for the detection pipeline.
///
/// Defaults are the values the detector was tuned with on scanned mazes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Sampling stride in both axes.
    pub step: usize,

    /// Rows skipped after a positive classification, on top of `step`.
    pub row_jump: usize,

    /// Two pixels are near when both coordinate differences are strictly
    /// below this value.
    pub similarity_threshold: usize,

    /// Traversal bound of each flood-fill.
    pub fill: FillBound,
}

impl DetectorConfig {
    /// Default sampling stride.
    pub const DEFAULT_STEP: usize = 5;
    /// Default extra row skip after a hit.
    pub const DEFAULT_ROW_JUMP: usize = 20;
    /// Default per-axis similarity threshold.
    pub const DEFAULT_SIMILARITY_THRESHOLD: usize = 5;
    /// Default lower visit threshold for [`FillBound::Sampled`].
    pub const DEFAULT_MIN_VISITS: usize = 200;
    /// Default visit cap for [`FillBound::Sampled`].
    pub const DEFAULT_MAX_VISITS: usize = 400;

    /// Check the configuration for values the scanner cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `step` or
    /// `similarity_threshold` is zero, or if a [`FillBound::Sampled`]
    /// bound has `max_visits == 0` or `min_visits > max_visits`.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.step == 0 {
            return Err(PipelineError::InvalidConfig(
                "step must be at least 1".to_string(),
            ));
        }
        if self.similarity_threshold == 0 {
            return Err(PipelineError::InvalidConfig(
                "similarity_threshold must be at least 1".to_string(),
            ));
        }
        if let FillBound::Sampled {
            min_visits,
            max_visits,
        } = self.fill
        {
            if max_visits == 0 {
                return Err(PipelineError::InvalidConfig(
                    "max_visits must be at least 1".to_string(),
                ));
            }
            if min_visits > max_visits {
                return Err(PipelineError::InvalidConfig(format!(
                    "min_visits ({min_visits}) exceeds max_visits ({max_visits})"
                )));
            }
        }
        Ok(())
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            step: Self::DEFAULT_STEP,
            row_jump: Self::DEFAULT_ROW_JUMP,
            similarity_threshold: Self::DEFAULT_SIMILARITY_THRESHOLD,
            fill: FillBound::DEFAULT_SAMPLED,
        }
    }
}

/// Result of running the detection pipeline over one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Number of distinct intersections (candidates not suppressed).
    pub count: usize,

    /// Surviving candidates, in scan order.
    pub intersections: Vec<Pixel>,

    /// Every raw candidate the scanner produced, in scan order.
    pub candidates: Vec<Pixel>,

    /// Parallel to `candidates`: `true` where a candidate was collapsed
    /// into an earlier one.
    pub suppressed: Vec<bool>,

    /// Extents of the scanned grid.
    pub dimensions: Dimensions,
}

impl Detection {
    /// Detection over an empty grid: nothing found.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            count: 0,
            intersections: Vec::new(),
            candidates: Vec::new(),
            suppressed: Vec::new(),
            dimensions: Dimensions {
                rows: 0,
                columns: 0,
            },
        }
    }
}

/// Errors that can occur during pipeline processing.
///
/// Uses custom `Serialize`/`Deserialize` because `image::ImageError`
/// does not implement serde traits. The `ImageDecode` variant is
/// serialized as its `Display` string.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Raw samples do not fill the requested grid.
    #[error("expected {expected} samples for the grid, got {actual}")]
    DimensionMismatch {
        /// `rows * columns`.
        expected: usize,
        /// Length of the sample slice.
        actual: usize,
    },

    /// Detector configuration is invalid.
    #[error("invalid detector configuration: {0}")]
    InvalidConfig(String),
}

/// Serde-compatible proxy for `PipelineError`.
///
/// `image::ImageError` does not implement serde, so the `ImageDecode`
/// variant stores its `Display` string instead.
#[derive(Serialize, Deserialize)]
enum PipelineErrorProxy {
    ImageDecode(String),
    EmptyInput,
    DimensionMismatch { expected: usize, actual: usize },
    InvalidConfig(String),
}

impl Serialize for PipelineError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let proxy = match self {
            Self::ImageDecode(e) => PipelineErrorProxy::ImageDecode(e.to_string()),
            Self::EmptyInput => PipelineErrorProxy::EmptyInput,
            Self::DimensionMismatch { expected, actual } => PipelineErrorProxy::DimensionMismatch {
                expected: *expected,
                actual: *actual,
            },
            Self::InvalidConfig(s) => PipelineErrorProxy::InvalidConfig(s.clone()),
        };
        proxy.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PipelineError {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let proxy = PipelineErrorProxy::deserialize(deserializer)?;
        Ok(match proxy {
            // The typed image error cannot be rebuilt; keep the message.
            PipelineErrorProxy::ImageDecode(msg) => {
                Self::InvalidConfig(format!("image decode error: {msg}"))
            }
            PipelineErrorProxy::EmptyInput => Self::EmptyInput,
            PipelineErrorProxy::DimensionMismatch { expected, actual } => {
                Self::DimensionMismatch { expected, actual }
            }
            PipelineErrorProxy::InvalidConfig(s) => Self::InvalidConfig(s),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn pixel_equality_is_structural() {
        assert_eq!(Pixel::new(3, 4), Pixel::new(3, 4));
        assert_ne!(Pixel::new(3, 4), Pixel::new(4, 3));
    }

    #[test]
    fn dimensions_area() {
        let d = Dimensions {
            rows: 7,
            columns: 11,
        };
        assert_eq!(d.area(), 77);
        assert_eq!(Dimensions::default().area(), 0);
    }

    #[test]
    fn detector_config_defaults() {
        let config = DetectorConfig::default();
        assert_eq!(config.step, 5);
        assert_eq!(config.row_jump, 20);
        assert_eq!(config.similarity_threshold, 5);
        assert_eq!(
            config.fill,
            FillBound::Sampled {
                min_visits: 200,
                max_visits: 400
            }
        );
        assert_eq!(config.fill, FillBound::default());
    }

    #[test]
    fn default_config_is_valid() {
        assert!(DetectorConfig::default().validate().is_ok());
        let exhaustive = DetectorConfig {
            fill: FillBound::Exhaustive,
            ..DetectorConfig::default()
        };
        assert!(exhaustive.validate().is_ok());
    }

    #[test]
    fn zero_step_is_rejected() {
        let config = DetectorConfig {
            step: 0,
            ..DetectorConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(ref s) if s.contains("step")));
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let config = DetectorConfig {
            similarity_threshold: 0,
            ..DetectorConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn inverted_visit_limits_are_rejected() {
        let config = DetectorConfig {
            fill: FillBound::Sampled {
                min_visits: 500,
                max_visits: 400,
            },
            ..DetectorConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid detector configuration: min_visits (500) exceeds max_visits (400)",
        );
    }

    #[test]
    fn zero_visit_cap_is_rejected() {
        let config = DetectorConfig {
            fill: FillBound::Sampled {
                min_visits: 0,
                max_visits: 0,
            },
            ..DetectorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_detection_counts_nothing() {
        let detection = Detection::empty();
        assert_eq!(detection.count, 0);
        assert!(detection.candidates.is_empty());
        assert_eq!(detection.dimensions, Dimensions::default());
    }

    #[test]
    fn error_display() {
        assert_eq!(
            PipelineError::EmptyInput.to_string(),
            "input image data is empty"
        );
        assert_eq!(
            PipelineError::DimensionMismatch {
                expected: 6,
                actual: 5
            }
            .to_string(),
            "expected 6 samples for the grid, got 5",
        );
    }

    #[test]
    fn partial_config_json_falls_back_to_defaults() {
        let config: DetectorConfig = serde_json::from_str(r#"{"step": 3}"#).unwrap();
        assert_eq!(config.step, 3);
        assert_eq!(config.row_jump, DetectorConfig::DEFAULT_ROW_JUMP);
        assert_eq!(config.fill, FillBound::DEFAULT_SAMPLED);
    }

    #[test]
    fn fill_bound_json_is_tagged() {
        let json = serde_json::to_string(&FillBound::Exhaustive).unwrap();
        assert_eq!(json, r#"{"kind":"exhaustive"}"#);
        let parsed: FillBound =
            serde_json::from_str(r#"{"kind":"sampled","min_visits":10,"max_visits":20}"#).unwrap();
        assert_eq!(
            parsed,
            FillBound::Sampled {
                min_visits: 10,
                max_visits: 20
            }
        );
    }

    #[test]
    fn pipeline_error_serde_keeps_dimension_mismatch() {
        let err = PipelineError::DimensionMismatch {
            expected: 4,
            actual: 3,
        };
        let json = serde_json::to_string(&err).unwrap();
        let back: PipelineError = serde_json::from_str(&json).unwrap();
        assert!(matches!(
            back,
            PipelineError::DimensionMismatch {
                expected: 4,
                actual: 3
            }
        ));
    }
}
