//! Visual overlay of a detection on top of the classified image.
//!
//! Renders the binary image (stroke white, traversable black) and marks
//! every counted intersection with a hollow circle. Suppressed duplicates
//! can optionally be shown as small crosses, which helps when tuning the
//! similarity threshold or the row jump.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_cross_mut, draw_hollow_circle_mut};

use crate::binary::BinaryImage;
use crate::types::{Detection, Pixel};

/// Marker colour for counted intersections.
pub const INTERSECTION_COLOR: Rgb<u8> = Rgb([255, 48, 48]);

/// Marker colour for suppressed duplicate candidates.
pub const SUPPRESSED_COLOR: Rgb<u8> = Rgb([255, 160, 0]);

const STROKE_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const BACKGROUND_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Options for [`render_overlay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayOptions {
    /// Radius of the intersection circles in pixels.
    pub marker_radius: u32,
    /// Also draw suppressed candidates.
    pub show_suppressed: bool,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            marker_radius: 6,
            show_suppressed: false,
        }
    }
}

/// Render `image` with `detection` markers drawn on top.
#[must_use = "returns the rendered overlay"]
pub fn render_overlay(
    image: &BinaryImage,
    detection: &Detection,
    options: &OverlayOptions,
) -> RgbImage {
    let width = to_u32(image.columns());
    let height = to_u32(image.rows());
    let mut canvas = RgbImage::from_fn(width, height, |x, y| {
        if image.is_background(Pixel::new(y as usize, x as usize)) {
            BACKGROUND_COLOR
        } else {
            STROKE_COLOR
        }
    });

    if options.show_suppressed {
        for (p, _) in detection
            .candidates
            .iter()
            .zip(&detection.suppressed)
            .filter(|&(_, &s)| s)
        {
            draw_cross_mut(&mut canvas, SUPPRESSED_COLOR, to_i32(p.col), to_i32(p.row));
        }
    }

    let radius = i32::try_from(options.marker_radius).unwrap_or(i32::MAX);
    for p in &detection.intersections {
        draw_hollow_circle_mut(
            &mut canvas,
            (to_i32(p.col), to_i32(p.row)),
            radius,
            INTERSECTION_COLOR,
        );
    }

    canvas
}

fn to_u32(v: usize) -> u32 {
    u32::try_from(v).unwrap_or(u32::MAX)
}

fn to_i32(v: usize) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}
