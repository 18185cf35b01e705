// THEORY:
// The `feed` module is the acquisition loop: a cooperative, fixed-interval
// polling tick that pulls at most one frame per tick from a `FrameSource` and
// runs it through the pipeline before the next tick is honored. The runner
// knows nothing about windows or device handles; display and plot sinks are
// plain callbacks supplied by the caller.
//
// Key architectural principles:
// 1.  **Explicit grab results**: `GrabResult` distinguishes a frame from a
//     bounded-wait timeout from a device error, instead of signaling failures
//     through exceptions. Timeouts and device errors are retryable: they are
//     logged and the tick rescheduled, and no sample is recorded for them.
// 2.  **Strictly sequential**: acquisition, analysis and the display/plot
//     sinks all run on the runner's task. There is no shared mutable state to
//     lock because nothing runs concurrently with anything else.
// 3.  **Cooperative cancellation**: clearing the run flag stops further ticks;
//     a frame already retrieved is always fully analyzed first.

use crate::Frame;
use crate::pipeline::{AnalysisMode, VisionPipeline};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::watch;

/// Default scheduling tick between acquisition attempts.
pub const DEFAULT_TICK: Duration = Duration::from_millis(10);

/// Outcome of one bounded-wait frame grab.
#[derive(Debug, Clone)]
pub enum GrabResult {
    /// A decoded 8-bit color frame.
    Frame(Frame),
    /// The bounded wait expired before a frame arrived.
    Timeout,
    /// The device reported a failure.
    DeviceError(String),
}

/// A pull-based frame supplier. Implementations wrap whatever acquisition
/// backend exists (a camera driver, a video file, a synthetic generator); the
/// runner only ever sees this interface.
pub trait FrameSource {
    /// Performs one blocking acquisition attempt with a bounded wait.
    fn next_frame(&mut self) -> GrabResult;
}

/// Drives a `FrameSource` through a `VisionPipeline` on a fixed-interval
/// tick. The mode is re-read from its channel once per processed frame, so it
/// may change between any two frames.
pub struct FeedRunner<S: FrameSource> {
    source: S,
    pipeline: VisionPipeline,
    tick: Duration,
    mode_rx: watch::Receiver<AnalysisMode>,
    run_rx: watch::Receiver<bool>,
}

impl<S: FrameSource> FeedRunner<S> {
    pub fn new(
        source: S,
        pipeline: VisionPipeline,
        mode_rx: watch::Receiver<AnalysisMode>,
        run_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            source,
            pipeline,
            tick: DEFAULT_TICK,
            mode_rx,
            run_rx,
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Runs until the run flag clears, handing each display frame and each
    /// redrawn plot to the caller's sinks. Returns the pipeline so the caller
    /// can export the accumulated history.
    pub async fn run(
        mut self,
        mut on_display: impl FnMut(&Frame),
        mut on_plot: impl FnMut(&Frame),
    ) -> VisionPipeline {
        let mut ticker = tokio::time::interval(self.tick);
        loop {
            if !*self.run_rx.borrow() {
                break;
            }
            ticker.tick().await;
            if !*self.run_rx.borrow() {
                break;
            }
            match self.source.next_frame() {
                GrabResult::Frame(frame) => {
                    let mode = *self.mode_rx.borrow();
                    let timestamp = wall_clock_seconds();
                    let (display, sample) = self.pipeline.process(&frame, mode, timestamp);
                    log::debug!(
                        "processed frame mode={} lines={} blobs={}",
                        mode,
                        sample.line_count,
                        sample.blob_count
                    );
                    on_display(&display);
                    // Redrawn every frame; the series only moved if the mode
                    // was composite.
                    on_plot(&self.pipeline.render_plots());
                }
                GrabResult::Timeout => {
                    log::warn!("frame grab timed out, retrying on next tick");
                }
                GrabResult::DeviceError(reason) => {
                    log::error!("camera device error: {reason}; retrying on next tick");
                }
            }
        }
        self.pipeline
    }
}

fn wall_clock_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
