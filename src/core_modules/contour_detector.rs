// THEORY:
// The `contour_detector` module traces region boundaries. The chain is
// grayscale -> Gaussian blur -> Canny (with the softer 50/150 thresholds, to
// keep weaker boundaries alive) -> border following on the edge map, keeping
// outer boundaries only. The traced polylines are both this primitive's
// overlay and the raw material for the shape detector, which re-uses
// `trace_outer_contours` rather than repeating the chain.

use crate::Frame;
use crate::core_modules::draw;
use crate::core_modules::line_detector::BLUR_SIGMA;
use image::imageops::grayscale;
use imageproc::contours::{BorderType, find_contours};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::point::Point;

const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 150.0;
const CONTOUR_WIDTH: u32 = 2;

/// Draws every outer contour on a copy of the input frame. A frame without
/// contours comes back as an unmarked copy. No metrics are derived here.
pub fn detect_contours(frame: &Frame) -> Frame {
    let mut out = frame.clone();
    for contour in trace_outer_contours(frame) {
        draw::draw_closed_polyline(&mut out, &contour, CONTOUR_WIDTH, draw::HIGHLIGHT_GREEN);
    }
    out
}

/// Runs the blur/Canny/border-following chain and returns the outer
/// boundaries as point chains in pixel coordinates.
pub(crate) fn trace_outer_contours(frame: &Frame) -> Vec<Vec<Point<i32>>> {
    let gray = grayscale(frame);
    let blurred = gaussian_blur_f32(&gray, BLUR_SIGMA);
    let edges = canny(&blurred, CANNY_LOW, CANNY_HIGH);
    find_contours::<i32>(&edges)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .map(|c| c.points)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    #[test]
    fn uniform_frame_has_no_contours() {
        let frame = Frame::from_pixel(100, 100, Rgb([255, 255, 255]));
        assert!(trace_outer_contours(&frame).is_empty());
        assert_eq!(detect_contours(&frame), frame);
    }

    #[test]
    fn dark_square_produces_an_outer_contour() {
        let mut frame = Frame::from_pixel(120, 120, Rgb([255, 255, 255]));
        draw_filled_rect_mut(&mut frame, Rect::at(30, 30).of_size(50, 50), Rgb([0, 0, 0]));
        let contours = trace_outer_contours(&frame);
        assert!(!contours.is_empty());
        // All traced points stay inside the frame.
        let inside = contours
            .iter()
            .flatten()
            .all(|p| p.x >= 0 && p.y >= 0 && p.x < 120 && p.y < 120);
        assert!(inside);
    }

    #[test]
    fn overlay_marks_the_boundary() {
        let mut frame = Frame::from_pixel(120, 120, Rgb([255, 255, 255]));
        draw_filled_rect_mut(&mut frame, Rect::at(30, 30).of_size(50, 50), Rgb([0, 0, 0]));
        let out = detect_contours(&frame);
        let green = out.pixels().filter(|p| p.0 == [0, 255, 0]).count();
        assert!(green > 0);
    }
}
