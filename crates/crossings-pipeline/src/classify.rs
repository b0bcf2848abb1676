//! Junction classification from a sampled stroke shape.
//!
//! A junction's stroke spreads in three or four directions, so the four
//! extremal pixels of the sampled region (top-most row, bottom-most row,
//! left-most column, right-most column) stay well apart. A straight
//! segment or a gentle curve collapses at least two of them together.

use crate::binary::BinaryImage;
use crate::flood::flood_fill;
use crate::types::{DetectorConfig, Pixel};

/// The four extremal pixels of a non-empty pixel set.
///
/// Each is the first pixel, in input order, to attain its extreme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extremes {
    /// Smallest row.
    pub min_row: Pixel,
    /// Largest row.
    pub max_row: Pixel,
    /// Smallest column.
    pub min_col: Pixel,
    /// Largest column.
    pub max_col: Pixel,
}

impl Extremes {
    /// Find the extremal pixels of `pixels`, or `None` if it is empty.
    #[must_use]
    pub fn of(pixels: &[Pixel]) -> Option<Self> {
        let (&first, rest) = pixels.split_first()?;
        let mut extremes = Self {
            min_row: first,
            max_row: first,
            min_col: first,
            max_col: first,
        };
        // Strict comparisons keep the first occurrence on ties.
        for &p in rest {
            if p.row < extremes.min_row.row {
                extremes.min_row = p;
            }
            if p.row > extremes.max_row.row {
                extremes.max_row = p;
            }
            if p.col < extremes.min_col.col {
                extremes.min_col = p;
            }
            if p.col > extremes.max_col.col {
                extremes.max_col = p;
            }
        }
        Some(extremes)
    }

    /// The extremal pixels as an array, in field order.
    #[must_use]
    pub const fn to_array(self) -> [Pixel; 4] {
        [self.min_row, self.max_row, self.min_col, self.max_col]
    }

    /// Whether no two extremal pixels are near each other.
    #[must_use]
    pub fn is_spread(self, threshold: usize) -> bool {
        let points = self.to_array();
        for (i, &a) in points.iter().enumerate() {
            for &b in &points[i + 1..] {
                if are_near(a, b, threshold) {
                    return false;
                }
            }
        }
        true
    }
}

/// Two pixels are near when both coordinate differences are below `threshold`.
///
/// This is a per-axis test, not a Euclidean distance.
#[must_use]
pub const fn are_near(a: Pixel, b: Pixel, threshold: usize) -> bool {
    a.row.abs_diff(b.row) < threshold && a.col.abs_diff(b.col) < threshold
}

/// Decide whether a sampled stroke set looks like a junction.
///
/// Empty input is never a junction, and neither is a single pixel: its
/// four extremes coincide.
#[must_use]
pub fn is_junction(stroke: &[Pixel], threshold: usize) -> bool {
    Extremes::of(stroke).is_some_and(|e| e.is_spread(threshold))
}

/// Outcome of one sample-and-classify cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the sampled region classified as a junction.
    pub junction: bool,
    /// Extremal pixels of the sampled stroke, if any was found.
    pub extremes: Option<Extremes>,
    /// Number of stroke pixels sampled.
    pub stroke_pixels: usize,
    /// Number of pixels the flood-fill visited.
    pub visited: usize,
}

/// Flood-fill from `seed` and classify the stroke shape around it.
///
/// `seed` must lie inside `image`.
#[must_use]
pub fn classify_seed(image: &BinaryImage, seed: Pixel, config: &DetectorConfig) -> Verdict {
    let fill = flood_fill(image, seed, config.fill);
    Verdict {
        junction: is_junction(&fill.stroke, config.similarity_threshold),
        extremes: Extremes::of(&fill.stroke),
        stroke_pixels: fill.stroke.len(),
        visited: fill.visited,
    }
}
