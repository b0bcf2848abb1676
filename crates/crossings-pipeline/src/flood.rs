//! Bounded breadth-first flood-fill ("shape sampler").
//!
//! Starting from a seed, the fill walks every 4-connected pixel
//! regardless of class and records the stroke pixels it pops, in pop
//! order. How far it walks is controlled by [`FillBound`].

use std::collections::VecDeque;

use crate::binary::BinaryImage;
use crate::types::{FillBound, Pixel};

/// Output of one flood-fill call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloodFill {
    /// Stroke pixels in the order they were popped from the queue.
    pub stroke: Vec<Pixel>,
    /// Number of pixels marked visited, seed included.
    pub visited: usize,
}

/// Flood-fill outward from `seed`, collecting stroke pixels.
///
/// The seed is marked visited and pre-counted as a stroke visit, which
/// keeps the background/stroke ratio well defined from the first
/// iteration. With [`FillBound::Sampled`] each newly marked pixel
/// advances the counter of its class; the loop runs while the queue is
/// non-empty, the total is below `max_visits`, and either the total is
/// below `min_visits` or background visits have not yet caught up with
/// stroke visits. Marking stops once the total reaches `max_visits`.
/// With [`FillBound::Exhaustive`] only the queue bounds the loop.
///
/// `seed` must lie inside `image`.
#[must_use = "returns the sampled stroke pixels"]
pub fn flood_fill(image: &BinaryImage, seed: Pixel, bound: FillBound) -> FloodFill {
    let mut visited = vec![false; image.rows() * image.columns()];
    let mut queue = VecDeque::new();
    let mut stroke = Vec::new();

    visited[image.index(seed)] = true;
    queue.push_back(seed);

    let mut stroke_visits: usize = 1;
    let mut background_visits: usize = 0;

    while keep_going(bound, stroke_visits, background_visits) {
        let Some(next) = queue.pop_front() else {
            break;
        };
        if image.is_stroke(next) {
            stroke.push(next);
        }

        for neighbor in image.neighbors(next) {
            let slot = &mut visited[image.index(neighbor)];
            if *slot {
                continue;
            }
            if let FillBound::Sampled { max_visits, .. } = bound
                && stroke_visits + background_visits >= max_visits
            {
                break;
            }
            *slot = true;
            queue.push_back(neighbor);
            if image.is_background(neighbor) {
                background_visits += 1;
            } else {
                stroke_visits += 1;
            }
        }
    }

    FloodFill {
        stroke,
        visited: stroke_visits + background_visits,
    }
}

/// Loop condition, evaluated before each pop.
const fn keep_going(bound: FillBound, stroke_visits: usize, background_visits: usize) -> bool {
    match bound {
        FillBound::Exhaustive => true,
        FillBound::Sampled {
            min_visits,
            max_visits,
        } => {
            let total = stroke_visits + background_visits;
            let background_outnumbered = background_visits / stroke_visits == 0;
            (background_outnumbered || total < min_visits) && total < max_visits
        }
    }
}
