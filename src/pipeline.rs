// THEORY:
// The `pipeline` module is the top-level API for the frame analysis engine.
// It owns the metrics history and dispatches each incoming frame to the
// analysis primitive selected by the active mode, merging the results into
// one display frame and exactly one metrics sample per call.
//
// Key architectural principles:
// 1.  **Closed mode set**: `AnalysisMode` is an enum, so dispatch is total.
//     The loosely-typed boundary is `FromStr`, which rejects unknown names
//     with an explicit error instead of silently falling through to the
//     composite path.
// 2.  **One sample per frame, atomically**: counts are computed first and the
//     sample appended last, so a panic inside a primitive can never leave a
//     half-recorded frame in the history.
// 3.  **Stateless mode switching**: no primitive carries state between
//     frames, so the mode may change between any two calls with no reset.

use crate::Frame;
use crate::core_modules::blob_detector::{BlobDetectorConfig, detect_blobs};
use crate::core_modules::color_segmenter::segment_colors;
use crate::core_modules::contour_detector::detect_contours;
use crate::core_modules::draw;
use crate::core_modules::edge_detector::detect_edges;
use crate::core_modules::line_detector::detect_lines;
use crate::core_modules::metrics::{MetricSample, MetricsHistory};
use crate::core_modules::plot;
use crate::core_modules::shape_detector::detect_shapes;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use thiserror::Error;

/// Errors surfaced at the pipeline boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// A mode name did not match any of the seven analyses. An unknown name
    /// is a configuration error, never a silent fallback to another mode.
    #[error("unknown analysis mode {0:?} (expected one of lines, blobs, color, edges, contours, shapes, both)")]
    UnknownMode(String),
}

/// The analysis applied to each frame. Exactly one mode is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    Lines,
    Blobs,
    Color,
    Edges,
    Contours,
    Shapes,
    /// Composite: lines and blobs run independently and their display frames
    /// blend with equal weight; both rolling series grow by one point.
    Both,
}

impl AnalysisMode {
    pub const ALL: [AnalysisMode; 7] = [
        AnalysisMode::Lines,
        AnalysisMode::Blobs,
        AnalysisMode::Color,
        AnalysisMode::Edges,
        AnalysisMode::Contours,
        AnalysisMode::Shapes,
        AnalysisMode::Both,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Lines => "lines",
            AnalysisMode::Blobs => "blobs",
            AnalysisMode::Color => "color",
            AnalysisMode::Edges => "edges",
            AnalysisMode::Contours => "contours",
            AnalysisMode::Shapes => "shapes",
            AnalysisMode::Both => "both",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisMode {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lines" => Ok(AnalysisMode::Lines),
            "blobs" => Ok(AnalysisMode::Blobs),
            "color" => Ok(AnalysisMode::Color),
            "edges" => Ok(AnalysisMode::Edges),
            "contours" => Ok(AnalysisMode::Contours),
            "shapes" => Ok(AnalysisMode::Shapes),
            "both" => Ok(AnalysisMode::Both),
            other => Err(PipelineError::UnknownMode(other.to_string())),
        }
    }
}

/// Configuration for the pipeline, fixed at startup.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Shared thresholds for every blob-detection call.
    pub blob_detector: BlobDetectorConfig,
    /// Width of the rendered metrics plot.
    pub plot_width: u32,
    /// Height of the rendered metrics plot (both panels together).
    pub plot_height: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            blob_detector: BlobDetectorConfig::default(),
            plot_width: plot::DEFAULT_PLOT_WIDTH,
            plot_height: plot::DEFAULT_PLOT_HEIGHT,
        }
    }
}

/// The main, top-level struct for the analysis engine. Owns the metrics
/// history for the lifetime of a run.
pub struct VisionPipeline {
    config: PipelineConfig,
    history: MetricsHistory,
}

impl VisionPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            history: MetricsHistory::new(),
        }
    }

    /// Analyzes one frame under the given mode. Returns the display frame and
    /// the metrics sample recorded for this call; counts the mode did not
    /// compute are 0. Exactly one sample is appended per call.
    pub fn process(&mut self, frame: &Frame, mode: AnalysisMode, timestamp: f64) -> (Frame, MetricSample) {
        let mut line_count = 0;
        let mut blob_count = 0;

        let display = match mode {
            AnalysisMode::Lines => {
                let (annotated, count) = detect_lines(frame);
                line_count = count;
                annotated
            }
            AnalysisMode::Blobs => {
                let (annotated, count) = detect_blobs(frame, &self.config.blob_detector);
                blob_count = count;
                annotated
            }
            AnalysisMode::Color => segment_colors(frame),
            AnalysisMode::Edges => detect_edges(frame),
            AnalysisMode::Contours => detect_contours(frame),
            AnalysisMode::Shapes => detect_shapes(frame),
            AnalysisMode::Both => {
                let (line_frame, lines) = detect_lines(frame);
                let (blob_frame, blobs) = detect_blobs(frame, &self.config.blob_detector);
                line_count = lines;
                blob_count = blobs;
                self.history.append_series(lines, blobs);
                draw::blend_equal(&line_frame, &blob_frame)
            }
        };

        let sample = MetricSample {
            timestamp,
            line_count,
            blob_count,
        };
        self.history.append(sample);
        (display, sample)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The full metrics record of this run.
    pub fn history(&self) -> &MetricsHistory {
        &self.history
    }

    /// Renders the two rolling series as the live dual plot.
    pub fn render_plots(&self) -> Frame {
        plot::render(&self.history, self.config.plot_width, self.config.plot_height)
    }

    /// Serializes the full metrics history as delimited text.
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.history.export_csv(writer)
    }
}
