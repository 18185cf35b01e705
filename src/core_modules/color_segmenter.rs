// THEORY:
// The `color_segmenter` module retains only the strongly-colored portion of a
// frame. Each pixel is converted to hue-saturation-value space and kept only
// when all three components fall inside a fixed inclusive range; everything
// else is zeroed. The retained pixels keep their original color, so the
// output reads as the input frame masked to its saturated regions.
//
// The component scales follow the common 8-bit camera convention: hue is
// halved into 0..=180 so it fits a byte, saturation and value span 0..=255.

use crate::Frame;
use image::Rgb;

/// Inclusive hue range, on the halved 0..=180 scale. The full range is kept,
/// so selection is driven by saturation and value.
const HUE_RANGE: (u8, u8) = (0, 180);
/// Inclusive saturation range.
const SAT_RANGE: (u8, u8) = (120, 255);
/// Inclusive value (brightness) range.
const VAL_RANGE: (u8, u8) = (70, 255);

/// Masks the frame to its in-range pixels. Produces a new frame; pixels
/// outside the range become black. No metrics are derived here.
pub fn segment_colors(frame: &Frame) -> Frame {
    let mut out = Frame::new(frame.width(), frame.height());
    for (x, y, px) in frame.enumerate_pixels() {
        let (h, s, v) = rgb_to_hsv(px);
        if in_range(h, HUE_RANGE) && in_range(s, SAT_RANGE) && in_range(v, VAL_RANGE) {
            out.put_pixel(x, y, *px);
        }
    }
    out
}

fn in_range(value: u8, range: (u8, u8)) -> bool {
    value >= range.0 && value <= range.1
}

/// 8-bit RGB to 8-bit HSV: H in 0..=180 (degrees halved), S and V in 0..=255.
pub(crate) fn rgb_to_hsv(px: &Rgb<u8>) -> (u8, u8, u8) {
    let [r, g, b] = px.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = (max - min) as f32;

    let v = max;
    let s = if max == 0 {
        0
    } else {
        (255.0 * delta / max as f32).round() as u8
    };
    if delta == 0.0 {
        return (0, s, v);
    }

    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let mut hue = if max == r {
        60.0 * (gf - bf) / delta
    } else if max == g {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    if hue < 0.0 {
        hue += 360.0;
    }
    ((hue / 2.0).round() as u8, s, v)
}
