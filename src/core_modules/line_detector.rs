// THEORY:
// The `line_detector` module implements the first of the analysis primitives:
// probabilistic straight-segment extraction. The classical chain is
// grayscale -> Gaussian blur -> Canny -> Hough accumulation, after which the
// accumulator peaks are converted back into concrete pixel segments.
//
// Key architectural principles:
// 1.  **Peaks are hypotheses, not results**: a Hough peak only says "many edge
//     pixels agree on this infinite line". The walker below turns each peak
//     into zero or more finite segments by tracing the edge map along the
//     line, splitting runs at gaps wider than `MAX_GAP` and discarding runs
//     shorter than `MIN_SEGMENT_LENGTH`.
// 2.  **Stateless transform**: one input frame in, one annotated copy plus a
//     segment count out. No memory of previous frames.

use crate::Frame;
use crate::core_modules::draw;
use image::GrayImage;
use image::imageops::grayscale;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::hough::{LineDetectionOptions, PolarLine, detect_lines as hough_lines};

/// Gaussian sigma equivalent to a 5x5 kernel with an auto-derived sigma
/// (0.3 * ((5 - 1) * 0.5 - 1) + 0.8).
pub(crate) const BLUR_SIGMA: f32 = 1.1;
const CANNY_LOW: f32 = 100.0;
const CANNY_HIGH: f32 = 200.0;
/// Minimum accumulator votes for a candidate line.
const VOTE_THRESHOLD: u32 = 50;
/// Non-maximum suppression radius in (r, angle) accumulator space.
const SUPPRESSION_RADIUS: u32 = 8;
/// Segments shorter than this are discarded.
const MIN_SEGMENT_LENGTH: f32 = 50.0;
/// Edge runs may be bridged across gaps up to this many pixels.
const MAX_GAP: u32 = 20;
const SEGMENT_WIDTH: u32 = 2;

/// A finite straight segment in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: (f32, f32),
    pub end: (f32, f32),
}

impl Segment {
    pub fn length(&self) -> f32 {
        let (dx, dy) = (self.end.0 - self.start.0, self.end.1 - self.start.1);
        (dx * dx + dy * dy).sqrt()
    }
}

/// Runs the full segment-detection chain and draws every detected segment on a
/// copy of the input frame. Returns the annotated copy and the segment count;
/// a frame without detectable segments comes back as an unmarked copy with
/// count 0.
pub fn detect_lines(frame: &Frame) -> (Frame, u32) {
    let segments = find_segments(frame);
    let mut out = frame.clone();
    for segment in &segments {
        draw::draw_segment_thick(
            &mut out,
            segment.start,
            segment.end,
            SEGMENT_WIDTH,
            draw::HIGHLIGHT_GREEN,
        );
    }
    (out, segments.len() as u32)
}

/// Detects segments without rendering, for callers that only need the geometry.
pub fn find_segments(frame: &Frame) -> Vec<Segment> {
    let gray = grayscale(frame);
    let blurred = gaussian_blur_f32(&gray, BLUR_SIGMA);
    let edges = canny(&blurred, CANNY_LOW, CANNY_HIGH);
    let lines = hough_lines(
        &edges,
        LineDetectionOptions {
            vote_threshold: VOTE_THRESHOLD,
            suppression_radius: SUPPRESSION_RADIUS,
        },
    );
    let mut segments = Vec::new();
    for line in &lines {
        walk_polar_line(&edges, line, &mut segments);
    }
    segments
}

/// Traces one polar-form line (r = x*cos(theta) + y*sin(theta)) through the
/// edge map, emitting the edge runs that survive the gap and length filters.
fn walk_polar_line(edges: &GrayImage, line: &PolarLine, segments: &mut Vec<Segment>) {
    let theta = (line.angle_in_degrees as f32).to_radians();
    let (sin, cos) = theta.sin_cos();
    let (w, h) = edges.dimensions();
    let diag = ((w * w + h * h) as f32).sqrt().ceil() as i32;

    // Foot of the normal from the origin, then the unit direction along the line.
    let (x0, y0) = (line.r * cos, line.r * sin);
    let (dx, dy) = (-sin, cos);

    let mut run_start: Option<(f32, f32)> = None;
    let mut run_end = (0.0, 0.0);
    let mut gap = 0u32;

    for t in -diag..=diag {
        let x = x0 + t as f32 * dx;
        let y = y0 + t as f32 * dy;
        if edge_near(edges, x, y) {
            if run_start.is_none() {
                run_start = Some((x, y));
            }
            run_end = (x, y);
            gap = 0;
        } else if let Some(start) = run_start {
            gap += 1;
            if gap > MAX_GAP {
                push_if_long_enough(segments, start, run_end);
                run_start = None;
            }
        }
    }
    if let Some(start) = run_start {
        push_if_long_enough(segments, start, run_end);
    }
}

fn push_if_long_enough(segments: &mut Vec<Segment>, start: (f32, f32), end: (f32, f32)) {
    let segment = Segment { start, end };
    if segment.length() >= MIN_SEGMENT_LENGTH {
        segments.push(segment);
    }
}

/// Checks the rounded position and its 8-neighborhood for an edge pixel,
/// tolerating the one-pixel rasterization jitter between the ideal line and
/// the discrete edge chain.
fn edge_near(edges: &GrayImage, x: f32, y: f32) -> bool {
    let (w, h) = edges.dimensions();
    let (cx, cy) = (x.round() as i64, y.round() as i64);
    for ny in cy - 1..=cy + 1 {
        for nx in cx - 1..=cx + 1 {
            if nx >= 0
                && ny >= 0
                && (nx as u32) < w
                && (ny as u32) < h
                && edges.get_pixel(nx as u32, ny as u32)[0] > 0
            {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    fn blank(w: u32, h: u32) -> Frame {
        Frame::from_pixel(w, h, Rgb([255, 255, 255]))
    }

    #[test]
    fn uniform_frame_has_no_segments() {
        let (out, count) = detect_lines(&blank(320, 240));
        assert_eq!(count, 0);
        assert_eq!(out, blank(320, 240));
    }

    #[test]
    fn long_horizontal_bar_is_detected() {
        let mut frame = blank(320, 240);
        draw_filled_rect_mut(
            &mut frame,
            Rect::at(40, 118).of_size(240, 8),
            Rgb([0, 0, 0]),
        );
        let (_, count) = detect_lines(&frame);
        assert!(count >= 1, "expected at least one segment, got {count}");
    }

    #[test]
    fn long_vertical_bar_is_detected() {
        let mut frame = blank(320, 240);
        draw_filled_rect_mut(
            &mut frame,
            Rect::at(158, 30).of_size(8, 180),
            Rgb([0, 0, 0]),
        );
        let (_, count) = detect_lines(&frame);
        assert!(count >= 1, "expected at least one segment, got {count}");
    }

    #[test]
    fn short_marks_are_filtered_out() {
        let mut frame = blank(320, 240);
        // A 20px tick is well under the 50px minimum segment length.
        draw_filled_rect_mut(
            &mut frame,
            Rect::at(150, 118).of_size(20, 8),
            Rgb([0, 0, 0]),
        );
        let segments = find_segments(&frame);
        assert!(segments.iter().all(|s| s.length() >= MIN_SEGMENT_LENGTH));
    }

    #[test]
    fn detection_is_deterministic() {
        let mut frame = blank(320, 240);
        draw_filled_rect_mut(
            &mut frame,
            Rect::at(40, 118).of_size(240, 8),
            Rgb([0, 0, 0]),
        );
        assert_eq!(detect_lines(&frame), detect_lines(&frame));
    }
}
