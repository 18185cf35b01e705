// THEORY:
// The `edge_detector` module is the simplest primitive: a straight Canny pass.
// The binary edge map is re-expressed as a 3-channel frame so every primitive
// hands the dispatcher the same frame type, whatever it computed internally.

use crate::Frame;
use image::imageops::grayscale;
use imageproc::edges::canny;

const CANNY_LOW: f32 = 100.0;
const CANNY_HIGH: f32 = 200.0;

/// Returns the Canny edge map of the frame, replicated into all three
/// channels. No metrics are derived here.
pub fn detect_edges(frame: &Frame) -> Frame {
    let gray = grayscale(frame);
    let edges = canny(&gray, CANNY_LOW, CANNY_HIGH);
    Frame::from_fn(frame.width(), frame.height(), |x, y| {
        let v = edges.get_pixel(x, y)[0];
        image::Rgb([v, v, v])
    })
}
