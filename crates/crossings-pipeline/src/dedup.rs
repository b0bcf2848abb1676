//! Collapse repeated detections of the same physical junction.
//!
//! Suppression only flows forward: a candidate can be suppressed by any
//! earlier candidate near it (suppressed or not), never by a later one,
//! so the first-seen detection of each junction survives.

use crate::classify::are_near;
use crate::types::Pixel;

/// Flag every candidate that is near an earlier candidate.
///
/// The result is parallel to `candidates`; `true` marks a duplicate.
/// Quadratic in the number of candidates, which the strided scan keeps
/// small.
#[must_use = "returns the suppression flags"]
pub fn deduplicate(candidates: &[Pixel], threshold: usize) -> Vec<bool> {
    let mut suppressed = vec![false; candidates.len()];
    for (i, &earlier) in candidates.iter().enumerate() {
        for (j, &later) in candidates.iter().enumerate().skip(i + 1) {
            if are_near(earlier, later, threshold) {
                if !suppressed[j] {
                    tracing::debug!(
                        row = later.row,
                        col = later.col,
                        kept_row = earlier.row,
                        kept_col = earlier.col,
                        "duplicate candidate suppressed"
                    );
                }
                suppressed[j] = true;
            }
        }
    }
    suppressed
}

/// Number of candidates that survived deduplication.
#[must_use]
pub fn count_kept(suppressed: &[bool]) -> usize {
    suppressed.iter().filter(|&&s| !s).count()
}

/// Surviving candidates, in input order.
#[must_use]
pub fn kept(candidates: &[Pixel], suppressed: &[bool]) -> Vec<Pixel> {
    candidates
        .iter()
        .zip(suppressed)
        .filter(|&(_, &s)| !s)
        .map(|(&p, _)| p)
        .collect()
}
