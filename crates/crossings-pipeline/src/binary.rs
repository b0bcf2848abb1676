//! Binary classification of an intensity grid.
//!
//! A sample belongs to the traversable ("background") class exactly when
//! its intensity is 0. Everything else is stroke. The test is an
//! equality, not a threshold: inputs are expected to be already
//! binarised drawings.

use image::GrayImage;

use crate::types::{Dimensions, Pixel, PipelineError};

/// Immutable grid of classified pixels, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryImage {
    background: Vec<bool>,
    rows: usize,
    columns: usize,
}

impl BinaryImage {
    /// Classify every pixel of a grayscale image.
    ///
    /// Image height becomes the row count and width the column count, so
    /// pixel `(x, y)` of the source lands at `Pixel { row: y, col: x }`.
    #[must_use]
    pub fn from_gray(image: &GrayImage) -> Self {
        let columns = image.width() as usize;
        let rows = image.height() as usize;
        // `as_raw` is row-major with one byte per pixel for `Luma<u8>`.
        let background = image.as_raw().iter().map(|&v| is_background_sample(v)).collect();
        Self {
            background,
            rows,
            columns,
        }
    }

    /// Classify a row-major slice of `rows * columns` samples.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::DimensionMismatch`] if the slice length
    /// does not equal `rows * columns`, or if that product overflows
    /// (reported as `usize::MAX` expected samples).
    pub fn from_samples(rows: usize, columns: usize, samples: &[u8]) -> Result<Self, PipelineError> {
        let expected = rows.checked_mul(columns).unwrap_or(usize::MAX);
        if samples.len() != expected {
            return Err(PipelineError::DimensionMismatch {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            background: samples.iter().map(|&v| is_background_sample(v)).collect(),
            rows,
            columns,
        })
    }

    /// A grid with no pixels.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            background: Vec::new(),
            rows: 0,
            columns: 0,
        }
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (0 for a grid without rows).
    #[must_use]
    pub const fn columns(&self) -> usize {
        if self.rows == 0 { 0 } else { self.columns }
    }

    /// Grid extents.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            rows: self.rows(),
            columns: self.columns(),
        }
    }

    /// Returns `true` if the grid holds no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows() == 0 || self.columns() == 0
    }

    /// Whether `(row, col)` lies inside the grid.
    ///
    /// Takes signed coordinates so that callers can look one step past
    /// either edge without underflow.
    #[must_use]
    pub fn contains(&self, row: isize, col: isize) -> bool {
        usize::try_from(row).is_ok_and(|r| r < self.rows())
            && usize::try_from(col).is_ok_and(|c| c < self.columns())
    }

    /// Whether `pixel` was classified as traversable (intensity 0).
    ///
    /// # Panics
    ///
    /// Panics if `pixel` is out of bounds. Check with
    /// [`contains`](Self::contains) first.
    #[must_use]
    pub fn is_background(&self, pixel: Pixel) -> bool {
        self.background[self.index(pixel)]
    }

    /// Whether `pixel` is a stroke pixel (non-zero intensity).
    ///
    /// # Panics
    ///
    /// Panics if `pixel` is out of bounds.
    #[must_use]
    pub fn is_stroke(&self, pixel: Pixel) -> bool {
        !self.is_background(pixel)
    }

    /// In-bounds 4-connected neighbours of `pixel`.
    ///
    /// The order is fixed: below, right, above, left. Flood-fill
    /// traversal order (and therefore extremal tie-breaking) depends on it.
    pub fn neighbors(&self, pixel: Pixel) -> impl Iterator<Item = Pixel> + use<'_> {
        let origin = isize::try_from(pixel.row)
            .ok()
            .zip(isize::try_from(pixel.col).ok());
        NEIGHBOR_OFFSETS.into_iter().filter_map(move |(dr, dc)| {
            let (row, col) = origin?;
            let (row, col) = (row.checked_add(dr)?, col.checked_add(dc)?);
            // `contains` rejects negatives, so `unsigned_abs` is the value.
            self.contains(row, col)
                .then(|| Pixel::new(row.unsigned_abs(), col.unsigned_abs()))
        })
    }

    /// Number of traversable pixels in the grid.
    #[must_use]
    pub fn background_count(&self) -> usize {
        self.background.iter().filter(|&&b| b).count()
    }

    /// Row-major index of an in-bounds pixel.
    pub(crate) const fn index(&self, pixel: Pixel) -> usize {
        pixel.row * self.columns + pixel.col
    }
}

/// Row/column offsets of the 4-connected neighbourhood, in visiting order.
const NEIGHBOR_OFFSETS: [(isize, isize); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Classification rule for a single sample.
#[must_use]
pub const fn is_background_sample(intensity: u8) -> bool {
    intensity == 0
}
