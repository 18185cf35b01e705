// The analysis primitives and their shared support modules. Each detector is
// an independent image-to-(image, metrics) transform; `pipeline` wires them to
// the active analysis mode.

pub mod blob_detector;
pub mod color_segmenter;
pub mod contour_detector;
pub mod draw;
pub mod edge_detector;
pub mod line_detector;
pub mod metrics;
pub mod plot;
pub mod shape_detector;
