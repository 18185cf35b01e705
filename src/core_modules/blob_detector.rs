// THEORY:
// The `blob_detector` module finds compact connected regions ("blobs") and
// summarizes each as a keypoint. The detection chain is grayscale -> Otsu
// binarization (dark regions as foreground) -> outer-boundary tracing, after
// which every candidate boundary runs a gauntlet of four shape filters.
//
// Key architectural principles:
// 1.  **All filters must pass**: area, circularity, convexity and inertia
//     ratio are evaluated per candidate and a blob must satisfy every one of
//     them simultaneously. Thresholds live in `BlobDetectorConfig`, built once
//     at startup and shared by every call.
// 2.  **Geometry from polygon moments**: centroid, orientation and the
//     inertia ratio are all derived from the boundary polygon's raw and
//     central moments (Green's theorem), so the filters agree with each other
//     on what the region's extent actually is.
// 3.  **Keypoints, not masks**: the output per blob is a center, an
//     equivalent-circle diameter and a principal-axis orientation. The
//     display frame draws these as rich markers on a copy of the input.

use crate::Frame;
use crate::core_modules::draw;
use image::imageops::grayscale;
use imageproc::contours::{BorderType, find_contours};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use imageproc::drawing::draw_hollow_circle_mut;
use imageproc::geometry::{arc_length, convex_hull};
use imageproc::point::Point;
use std::f64::consts::PI;

/// Shape filter thresholds for blob candidates. Immutable once constructed.
#[derive(Debug, Clone, Copy)]
pub struct BlobDetectorConfig {
    /// Minimum enclosed area in square pixels.
    pub min_area: f64,
    /// Minimum circularity, 4*pi*area / perimeter^2. 1.0 is a perfect circle.
    pub min_circularity: f64,
    /// Minimum ratio of area to convex-hull area.
    pub min_convexity: f64,
    /// Minimum ratio of the smallest to the largest principal moment.
    pub min_inertia_ratio: f64,
}

impl Default for BlobDetectorConfig {
    fn default() -> Self {
        Self {
            min_area: 150.0,
            min_circularity: 0.1,
            min_convexity: 0.5,
            min_inertia_ratio: 0.01,
        }
    }
}

/// A detected blob, summarized as a keypoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlobKeypoint {
    /// Centroid of the blob region.
    pub center: (f32, f32),
    /// Diameter of the circle with the same area as the blob.
    pub diameter: f32,
    /// Principal-axis orientation in radians.
    pub orientation: f32,
}

/// Frames with less luminance spread than this are treated as blob-free
/// rather than handed to Otsu, which would otherwise split noise.
const MIN_CONTRAST: u8 = 8;

/// Detects blobs and draws each keypoint (sized circle plus orientation tick)
/// on a copy of the input frame. Returns the annotated copy and the keypoint
/// count; no blobs is a valid zero-count result, not an error.
pub fn detect_blobs(frame: &Frame, config: &BlobDetectorConfig) -> (Frame, u32) {
    let keypoints = find_blob_keypoints(frame, config);
    let mut out = frame.clone();
    for kp in &keypoints {
        let center = (kp.center.0.round() as i32, kp.center.1.round() as i32);
        let radius = (kp.diameter / 2.0).round().max(1.0) as i32;
        draw_hollow_circle_mut(&mut out, center, radius, draw::HIGHLIGHT_RED);
        let tip = (
            kp.center.0 + kp.orientation.cos() * (kp.diameter / 2.0),
            kp.center.1 + kp.orientation.sin() * (kp.diameter / 2.0),
        );
        draw::draw_segment_thick(&mut out, kp.center, tip, 1, draw::HIGHLIGHT_RED);
    }
    (out, keypoints.len() as u32)
}

/// Detects blob keypoints without rendering.
pub fn find_blob_keypoints(frame: &Frame, config: &BlobDetectorConfig) -> Vec<BlobKeypoint> {
    let gray = grayscale(frame);
    let (mut lo, mut hi) = (u8::MAX, u8::MIN);
    for p in gray.pixels() {
        lo = lo.min(p[0]);
        hi = hi.max(p[0]);
    }
    if hi.saturating_sub(lo) < MIN_CONTRAST {
        return Vec::new();
    }

    // Dark regions become the traced foreground.
    let binary = threshold(&gray, otsu_level(&gray), ThresholdType::BinaryInverted);
    let contours = find_contours::<i32>(&binary);

    let mut keypoints = Vec::new();
    for contour in &contours {
        if contour.border_type != BorderType::Outer || contour.points.len() < 3 {
            continue;
        }
        if let Some(kp) = evaluate_candidate(&contour.points, config) {
            keypoints.push(kp);
        }
    }
    keypoints
}

/// Applies the four shape filters to one boundary polygon. Returns the
/// keypoint only when every filter passes.
fn evaluate_candidate(points: &[Point<i32>], config: &BlobDetectorConfig) -> Option<BlobKeypoint> {
    let moments = PolygonMoments::of(points)?;
    let area = moments.area();
    if area < config.min_area {
        return None;
    }

    let perimeter = arc_length(points, true);
    if perimeter <= f64::EPSILON {
        return None;
    }
    let circularity = 4.0 * PI * area / (perimeter * perimeter);
    if circularity < config.min_circularity {
        return None;
    }

    let hull = convex_hull(points.to_vec());
    let hull_area = polygon_area(&hull);
    if hull_area <= f64::EPSILON {
        return None;
    }
    let convexity = area / hull_area;
    if convexity < config.min_convexity {
        return None;
    }

    if moments.inertia_ratio() < config.min_inertia_ratio {
        return None;
    }

    let (cx, cy) = moments.centroid();
    Some(BlobKeypoint {
        center: (cx as f32, cy as f32),
        diameter: 2.0 * (area / PI).sqrt() as f32,
        orientation: moments.orientation() as f32,
    })
}

/// Raw and central moments of a closed polygon, via Green's theorem. Signs are
/// normalized so winding direction does not matter.
struct PolygonMoments {
    m00: f64,
    mu20: f64,
    mu11: f64,
    mu02: f64,
    cx: f64,
    cy: f64,
}

impl PolygonMoments {
    fn of(points: &[Point<i32>]) -> Option<Self> {
        let n = points.len();
        if n < 3 {
            return None;
        }
        let (mut m00, mut m10, mut m01) = (0.0, 0.0, 0.0);
        let (mut m20, mut m11, mut m02) = (0.0, 0.0, 0.0);
        for i in 0..n {
            let p = points[i];
            let q = points[(i + 1) % n];
            let (xi, yi) = (p.x as f64, p.y as f64);
            let (xj, yj) = (q.x as f64, q.y as f64);
            let cross = xi * yj - xj * yi;
            m00 += cross;
            m10 += (xi + xj) * cross;
            m01 += (yi + yj) * cross;
            m20 += (xi * xi + xi * xj + xj * xj) * cross;
            m02 += (yi * yi + yi * yj + yj * yj) * cross;
            m11 += (xi * yj + 2.0 * xi * yi + 2.0 * xj * yj + xj * yi) * cross;
        }
        m00 /= 2.0;
        if m00.abs() <= f64::EPSILON {
            return None;
        }
        m10 /= 6.0;
        m01 /= 6.0;
        m20 /= 12.0;
        m02 /= 12.0;
        m11 /= 24.0;
        if m00 < 0.0 {
            m00 = -m00;
            m10 = -m10;
            m01 = -m01;
            m20 = -m20;
            m02 = -m02;
            m11 = -m11;
        }
        let cx = m10 / m00;
        let cy = m01 / m00;
        Some(Self {
            m00,
            mu20: m20 - cx * m10,
            mu11: m11 - cx * m01,
            mu02: m02 - cy * m01,
            cx,
            cy,
        })
    }

    fn area(&self) -> f64 {
        self.m00
    }

    fn centroid(&self) -> (f64, f64) {
        (self.cx, self.cy)
    }

    /// Ratio of the minimum to the maximum principal moment of inertia, in
    /// [0, 1]. Elongated regions score low, isotropic regions score near 1.
    fn inertia_ratio(&self) -> f64 {
        let denominator = ((2.0 * self.mu11).powi(2) + (self.mu20 - self.mu02).powi(2)).sqrt();
        if denominator <= 1e-2 {
            return 1.0;
        }
        let cos_min = (self.mu20 - self.mu02) / denominator;
        let sin_min = 2.0 * self.mu11 / denominator;
        let half_sum = 0.5 * (self.mu20 + self.mu02);
        let half_diff = 0.5 * (self.mu20 - self.mu02);
        let i_min = half_sum - half_diff * cos_min - self.mu11 * sin_min;
        let i_max = half_sum + half_diff * cos_min + self.mu11 * sin_min;
        if i_max <= f64::EPSILON {
            1.0
        } else {
            (i_min / i_max).clamp(0.0, 1.0)
        }
    }

    fn orientation(&self) -> f64 {
        0.5 * (2.0 * self.mu11).atan2(self.mu20 - self.mu02)
    }
}

fn polygon_area(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut doubled = 0.0;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        doubled += p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64;
    }
    (doubled / 2.0).abs()
}
