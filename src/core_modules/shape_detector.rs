// THEORY:
// The `shape_detector` module names the shapes in a frame. It re-uses the
// contour chain from `contour_detector`, collapses each boundary into a
// polygon with a perimeter-proportional tolerance, and classifies the result
// purely by vertex count. This is a deliberately blunt heuristic: anything
// that is not a recognizable low-order polygon falls back to "Circle", which
// in practice covers smooth boundaries whose approximations keep many
// vertices.
//
// Key architectural principles:
// 1.  **Classification is a pure function**: `classify_shape` sees only the
//     approximated vertices and returns a label. It is independently testable
//     and has no idea images exist.
// 2.  **Every contour gets labelled**: the detector draws an outline and a
//     label for every traced boundary, not just the confident ones. This is
//     an operator-assist overlay, and showing the raw decisions is the point.

use crate::Frame;
use crate::core_modules::contour_detector::trace_outer_contours;
use crate::core_modules::draw;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;

/// Polygon-approximation tolerance as a fraction of the contour perimeter.
const APPROX_TOLERANCE: f64 = 0.04;
/// Aspect-ratio band (inclusive) inside which a quadrilateral counts as square.
const SQUARE_ASPECT: (f64, f64) = (0.95, 1.05);
const OUTLINE_WIDTH: u32 = 2;
const LABEL_SCALE: u32 = 2;
/// Vertical offset of the label above its polygon's first vertex.
const LABEL_RAISE: i32 = 10;

/// Names a polygon by vertex count. Quadrilaterals split into "Square" and
/// "Rectangle" on bounding-box aspect ratio; anything other than 3, 4 or 5
/// vertices falls back to "Circle".
pub fn classify_shape(vertices: &[Point<i32>]) -> &'static str {
    match vertices.len() {
        3 => "Triangle",
        4 => {
            let (min_x, max_x, min_y, max_y) = bounds(vertices);
            let width = (max_x - min_x) as f64;
            let height = (max_y - min_y) as f64;
            if height > 0.0 {
                let aspect = width / height;
                if (SQUARE_ASPECT.0..=SQUARE_ASPECT.1).contains(&aspect) {
                    "Square"
                } else {
                    "Rectangle"
                }
            } else {
                "Rectangle"
            }
        }
        5 => "Pentagon",
        _ => "Circle",
    }
}

/// Approximates and classifies every outer contour, drawing the polygon
/// outline and its label on a copy of the input frame. No numeric metrics are
/// derived here.
pub fn detect_shapes(frame: &Frame) -> Frame {
    let mut out = frame.clone();
    for contour in trace_outer_contours(frame) {
        if contour.len() < 3 {
            continue;
        }
        let perimeter = arc_length(&contour, true);
        if perimeter <= f64::EPSILON {
            continue;
        }
        let approx = approximate_polygon_dp(&contour, APPROX_TOLERANCE * perimeter, true);
        if approx.is_empty() {
            continue;
        }
        let label = classify_shape(&approx);
        draw::draw_closed_polyline(&mut out, &approx, OUTLINE_WIDTH, draw::HIGHLIGHT_GREEN);
        let anchor = approx[0];
        draw::draw_text(
            &mut out,
            label,
            anchor.x,
            anchor.y - LABEL_RAISE - draw::text_height(LABEL_SCALE) as i32,
            LABEL_SCALE,
            draw::HIGHLIGHT_GREEN,
        );
    }
    out
}

fn bounds(vertices: &[Point<i32>]) -> (i32, i32, i32, i32) {
    let mut min_x = i32::MAX;
    let mut max_x = i32::MIN;
    let mut min_y = i32::MAX;
    let mut max_y = i32::MIN;
    for v in vertices {
        min_x = min_x.min(v.x);
        max_x = max_x.max(v.x);
        min_y = min_y.min(v.y);
        max_y = max_y.max(v.y);
    }
    (min_x, max_x, min_y, max_y)
}
