// THEORY:
// The `draw` module collects the overlay-rendering utilities shared by every
// analysis primitive. The primitives themselves only decide WHAT to highlight
// (segments, keypoints, polygons, labels); this module decides HOW those marks
// are rasterized onto a display frame.
//
// Key architectural principles:
// 1.  **Frames stay plain `RgbImage`s**: every helper draws in place on a
//     mutable canvas the caller already owns. No helper allocates a frame
//     except `blend_equal`, whose whole job is producing the composite.
// 2.  **Self-contained label font**: shape labels are drawn with a small 5x7
//     bitmap font instead of pulling a glyph-rasterization stack into the
//     crate. Overlay text here is a handful of fixed ASCII words, nothing more.

use crate::Frame;
use image::Rgb;
use imageproc::drawing::draw_line_segment_mut;
use imageproc::point::Point;

/// Highlight color for detected line segments, contours and shape outlines.
pub const HIGHLIGHT_GREEN: Rgb<u8> = Rgb([0, 255, 0]);
/// Highlight color for blob keypoints.
pub const HIGHLIGHT_RED: Rgb<u8> = Rgb([255, 0, 0]);

/// Draws a line segment with the given stroke width by stacking unit-width
/// segments offset along the perpendicular of the stroke direction.
pub fn draw_segment_thick(
    canvas: &mut Frame,
    start: (f32, f32),
    end: (f32, f32),
    width: u32,
    color: Rgb<u8>,
) {
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let len = (dx * dx + dy * dy).sqrt();
    // Degenerate segment: still mark the pixel.
    let (px, py) = if len > f32::EPSILON {
        (-dy / len, dx / len)
    } else {
        (0.0, 1.0)
    };
    let half = (width.max(1) - 1) as f32 / 2.0;
    for i in 0..width.max(1) {
        let off = i as f32 - half;
        draw_line_segment_mut(
            canvas,
            (start.0 + px * off, start.1 + py * off),
            (end.0 + px * off, end.1 + py * off),
            color,
        );
    }
}

/// Draws a closed polyline through `points` with the given stroke width.
/// A single point degenerates to a dot; an empty slice draws nothing.
pub fn draw_closed_polyline(canvas: &mut Frame, points: &[Point<i32>], width: u32, color: Rgb<u8>) {
    if points.is_empty() {
        return;
    }
    for pair in points.windows(2) {
        draw_segment_thick(
            canvas,
            (pair[0].x as f32, pair[0].y as f32),
            (pair[1].x as f32, pair[1].y as f32),
            width,
            color,
        );
    }
    let (first, last) = (points[0], points[points.len() - 1]);
    draw_segment_thick(
        canvas,
        (last.x as f32, last.y as f32),
        (first.x as f32, first.y as f32),
        width,
        color,
    );
}

/// Blends two equally-sized frames with equal weight, averaging each channel.
/// Mirrors a 0.5/0.5 weighted add; the average of two `u8` values can never
/// overflow, so the result is saturation-safe by construction.
pub fn blend_equal(a: &Frame, b: &Frame) -> Frame {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    let mut out = a.clone();
    for (dst, src) in out.pixels_mut().zip(b.pixels()) {
        for c in 0..3 {
            dst.0[c] = ((dst.0[c] as u16 + src.0[c] as u16) / 2) as u8;
        }
    }
    out
}

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
/// Horizontal advance between glyphs, in font units (before scaling).
const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;

/// 5x7 uppercase bitmap font, one row per byte, most significant of the low
/// five bits on the left. Index 0 is 'A'.
const GLYPHS: [[u8; 7]; 26] = [
    [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // A
    [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E], // B
    [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E], // C
    [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E], // D
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F], // E
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10], // F
    [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0E], // G
    [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // H
    [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E], // I
    [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C], // J
    [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11], // K
    [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F], // L
    [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11], // M
    [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11], // N
    [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // O
    [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10], // P
    [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D], // Q
    [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11], // R
    [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E], // S
    [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // T
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // U
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04], // V
    [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A], // W
    [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11], // X
    [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04], // Y
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F], // Z
];

/// Draws `text` with its top-left corner at `(x, y)`. Letters are uppercased;
/// characters outside A-Z advance the cursor without drawing (rendered as a
/// space). Pixels falling outside the canvas are clipped.
pub fn draw_text(canvas: &mut Frame, text: &str, x: i32, y: i32, scale: u32, color: Rgb<u8>) {
    let scale = scale.max(1);
    let (w, h) = canvas.dimensions();
    let mut cursor = x;
    for ch in text.chars() {
        if let Some(idx) = glyph_index(ch) {
            let rows = &GLYPHS[idx];
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits >> (GLYPH_WIDTH - 1 - col) & 1 == 0 {
                        continue;
                    }
                    for sy in 0..scale {
                        for sx in 0..scale {
                            let px = cursor + (col * scale + sx) as i32;
                            let py = y + (row as u32 * scale + sy) as i32;
                            if px >= 0 && py >= 0 && (px as u32) < w && (py as u32) < h {
                                canvas.put_pixel(px as u32, py as u32, color);
                            }
                        }
                    }
                }
            }
        }
        cursor += (GLYPH_ADVANCE * scale) as i32;
    }
}

/// Pixel height of text drawn at the given scale.
pub fn text_height(scale: u32) -> u32 {
    GLYPH_HEIGHT * scale.max(1)
}

fn glyph_index(ch: char) -> Option<usize> {
    let upper = ch.to_ascii_uppercase();
    if upper.is_ascii_uppercase() {
        Some(upper as usize - 'A' as usize)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_equal_averages_channels() {
        let a = Frame::from_pixel(4, 4, Rgb([200, 0, 100]));
        let b = Frame::from_pixel(4, 4, Rgb([100, 50, 100]));
        let blended = blend_equal(&a, &b);
        assert_eq!(blended.get_pixel(0, 0), &Rgb([150, 25, 100]));
    }

    #[test]
    fn blend_equal_handles_extremes_without_overflow() {
        let a = Frame::from_pixel(2, 2, Rgb([255, 255, 255]));
        let b = Frame::from_pixel(2, 2, Rgb([255, 0, 255]));
        let blended = blend_equal(&a, &b);
        assert_eq!(blended.get_pixel(1, 1), &Rgb([255, 127, 255]));
    }

    #[test]
    fn draw_text_marks_pixels_inside_canvas() {
        let mut canvas = Frame::from_pixel(64, 16, Rgb([0, 0, 0]));
        draw_text(&mut canvas, "Triangle", 1, 1, 1, HIGHLIGHT_GREEN);
        let lit = canvas.pixels().filter(|p| p.0 == [0, 255, 0]).count();
        assert!(lit > 0);
    }

    #[test]
    fn draw_text_clips_offscreen_labels() {
        let mut canvas = Frame::from_pixel(8, 8, Rgb([0, 0, 0]));
        // Entirely above the canvas, as labels near the image top edge can be.
        draw_text(&mut canvas, "Square", 0, -40, 2, HIGHLIGHT_GREEN);
        assert!(canvas.pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn thick_segment_covers_width() {
        let mut canvas = Frame::from_pixel(20, 20, Rgb([0, 0, 0]));
        draw_segment_thick(&mut canvas, (2.0, 10.0), (17.0, 10.0), 2, HIGHLIGHT_RED);
        // Both rows of the 2px-wide horizontal stroke are present.
        assert_eq!(canvas.get_pixel(10, 10), &HIGHLIGHT_RED);
        assert_eq!(canvas.get_pixel(10, 9), &HIGHLIGHT_RED);
    }
}
