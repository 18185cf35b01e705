// THEORY:
// This file is the main entry point for the `seg_vision` library crate. It
// exposes the frame analysis engine as a small, high-level surface: the
// `VisionPipeline` dispatcher, the `AnalysisMode` selector, the metrics
// history types, and the acquisition-loop abstractions in `feed`. The
// individual analysis primitives live in `core_modules` and remain reachable
// for callers that want a single transform without the pipeline.

pub mod core_modules;
pub mod feed;
pub mod pipeline;

/// A decoded 8-bit, 3-channel color frame. Primitives never mutate their
/// input frame; each produces a new one.
pub type Frame = image::RgbImage;

pub use crate::core_modules::blob_detector::{BlobDetectorConfig, BlobKeypoint};
pub use crate::core_modules::metrics::{MetricSample, MetricsHistory};
pub use crate::feed::{FeedRunner, FrameSource, GrabResult};
pub use crate::pipeline::{AnalysisMode, PipelineConfig, PipelineError, VisionPipeline};
