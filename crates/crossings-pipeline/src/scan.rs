//! Strided candidate scan.
//!
//! Samples the grid every `step` pixels in both axes. Each traversable
//! sample gets one flood-fill + classification cycle; positives become
//! raw candidates. After a hit the scanner skips `row_jump` extra rows
//! to avoid re-testing the same feature. The skip is a heuristic, so
//! duplicates still happen and are collapsed by [`crate::dedup`].

use crate::binary::BinaryImage;
use crate::classify::classify_seed;
use crate::types::{DetectorConfig, Pixel};

/// Scan `image` and return raw junction candidates in scan order.
///
/// Rows are visited from the top, columns left to right. A hit does not
/// cut the current row short: the remaining columns of that row are still
/// sampled, and the accumulated `row_jump` for every hit in the row is
/// added when moving to the next sampled row.
///
/// `config.step` must be non-zero; see [`DetectorConfig::validate`].
#[must_use = "returns the raw candidate list"]
pub fn scan(image: &BinaryImage, config: &DetectorConfig) -> Vec<Pixel> {
    let mut candidates = Vec::new();
    let step = config.step.max(1);

    let mut row = 0;
    while row < image.rows() {
        let mut pending_skip: usize = 0;

        let mut col = 0;
        while col < image.columns() {
            let sample = Pixel::new(row, col);
            if image.is_background(sample) {
                let verdict = classify_seed(image, sample, config);
                if verdict.junction {
                    tracing::debug!(
                        row,
                        col,
                        stroke_pixels = verdict.stroke_pixels,
                        visited = verdict.visited,
                        "junction candidate"
                    );
                    candidates.push(sample);
                    pending_skip = pending_skip.saturating_add(config.row_jump);
                }
            }
            col += step;
        }

        // Saturates so a huge row jump ends the scan instead of wrapping.
        row = row.saturating_add(step).saturating_add(pending_skip);
    }

    candidates
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::FillBound;

    fn from_fn(rows: usize, columns: usize, f: impl Fn(usize, usize) -> u8) -> BinaryImage {
        let samples: Vec<u8> = (0..rows)
            .flat_map(|r| (0..columns).map(move |c| (r, c)))
            .map(|(r, c)| f(r, c))
            .collect();
        BinaryImage::from_samples(rows, columns, &samples).unwrap()
    }

    #[test]
    fn empty_grid_scans_nothing() {
        assert!(scan(&BinaryImage::empty(), &DetectorConfig::default()).is_empty());
    }

    #[test]
    fn all_background_has_no_candidates() {
        let image = from_fn(80, 80, |_, _| 0);
        assert!(scan(&image, &DetectorConfig::default()).is_empty());
    }

    #[test]
    fn all_stroke_has_no_candidates() {
        let image = from_fn(80, 80, |_, _| 255);
        assert!(scan(&image, &DetectorConfig::default()).is_empty());
    }

    #[test]
    fn straight_line_has_no_candidates() {
        let image = from_fn(64, 64, |r, c| if r == 31 && (5..60).contains(&c) { 255 } else { 0 });
        assert!(scan(&image, &DetectorConfig::default()).is_empty());
    }

    #[test]
    fn plus_yields_candidates_near_its_centre() {
        let image = from_fn(64, 64, |r, c| {
            let on_vertical = c == 31 && (11..=51).contains(&r);
            let on_horizontal = r == 31 && (11..=51).contains(&c);
            if on_vertical || on_horizontal { 255 } else { 0 }
        });
        let candidates = scan(&image, &DetectorConfig::default());
        assert!(!candidates.is_empty());
        for c in &candidates {
            assert!(
                c.row.abs_diff(31) <= 12 && c.col.abs_diff(31) <= 12,
                "candidate {c:?} far from the junction"
            );
        }
    }

    #[test]
    fn hit_skips_following_rows_but_finishes_current_row() {
        // Exhaustive fill sees the whole "+" from every traversable
        // sample, so every sample of a scanned row is a hit.
        let image = from_fn(40, 40, |r, c| {
            if (r == 20 && (5..35).contains(&c)) || (c == 22 && (5..35).contains(&r)) {
                255
            } else {
                0
            }
        });
        let config = DetectorConfig {
            fill: FillBound::Exhaustive,
            ..DetectorConfig::default()
        };
        let candidates = scan(&image, &config);

        let rows: Vec<usize> = candidates.iter().map(|p| p.row).collect();
        // Row 0 has 8 hits (columns 0..40 step 5), so the next sampled row
        // is 0 + 5 + 8 * 20, past the bottom edge.
        assert_eq!(rows, vec![0; 8]);
        let cols: Vec<usize> = candidates.iter().map(|p| p.col).collect();
        assert_eq!(cols, vec![0, 5, 10, 15, 20, 25, 30, 35]);
    }

    #[test]
    fn step_controls_sample_positions() {
        // A lone traversable pixel at (3, 3) is only reachable with step 3.
        let image = from_fn(10, 10, |r, c| if (r, c) == (3, 3) { 0 } else { 255 });
        let config = DetectorConfig {
            step: 3,
            ..DetectorConfig::default()
        };
        let default_hits = scan(&image, &DetectorConfig::default());
        let step3_hits = scan(&image, &config);
        assert!(default_hits.is_empty());
        // The seed's surroundings are a solid block with a single hole,
        // so whether it classifies depends only on the fill, not on which
        // sample reached it.
        assert!(step3_hits.iter().all(|p| *p == Pixel::new(3, 3)));
    }

    #[test]
    fn huge_row_jump_stops_after_first_hit_row() {
        let image = from_fn(64, 64, |r, c| {
            let on_vertical = c == 31 && (11..=51).contains(&r);
            let on_horizontal = r == 31 && (11..=51).contains(&c);
            if on_vertical || on_horizontal { 255 } else { 0 }
        });
        let all = scan(&image, &DetectorConfig::default());
        let first_row = all.first().unwrap().row;
        let expected: Vec<Pixel> = all.iter().copied().filter(|p| p.row == first_row).collect();

        for step in [1, DetectorConfig::DEFAULT_STEP] {
            let config = DetectorConfig {
                step,
                row_jump: usize::MAX,
                ..DetectorConfig::default()
            };
            config.validate().unwrap();
            let candidates = scan(&image, &config);
            assert!(!candidates.is_empty(), "step {step}");
            let row = candidates[0].row;
            assert!(candidates.iter().all(|p| p.row == row), "step {step}: {candidates:?}");
            if step == DetectorConfig::DEFAULT_STEP {
                assert_eq!(candidates, expected);
            }
        }
    }

    #[test]
    fn scan_is_deterministic() {
        let image = from_fn(90, 90, |r, c| {
            if r % 30 == 15 || c % 30 == 15 { 255 } else { 0 }
        });
        let config = DetectorConfig::default();
        assert_eq!(scan(&image, &config), scan(&image, &config));
    }
}
