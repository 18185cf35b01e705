// Example runner for the `seg_vision` library: drives the pipeline from a
// synthetic frame source (no camera needed) and dumps the metrics history as
// CSV when the run completes.
//
// Usage: seg_vision <mode> [frame_count] [csv_output_path]

use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::time::Duration;

use anyhow::Context;
use image::Rgb;
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use seg_vision::{
    AnalysisMode, FeedRunner, Frame, FrameSource, GrabResult, PipelineConfig, VisionPipeline,
};
use tokio::sync::watch;

/// Generates frames containing a long bar, a filled disc and a triangle, so
/// every analysis mode has something to find. The disc drifts a little per
/// frame to keep the rolling series moving. Every eighth grab simulates a
/// bounded-wait timeout.
struct SyntheticSource {
    frames_left: u32,
    tick: u32,
    run_tx: watch::Sender<bool>,
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> GrabResult {
        if self.frames_left == 0 {
            let _ = self.run_tx.send(false);
            return GrabResult::Timeout;
        }
        self.tick += 1;
        if self.tick % 8 == 0 {
            return GrabResult::Timeout;
        }
        self.frames_left -= 1;

        let mut frame = Frame::from_pixel(640, 480, Rgb([235, 235, 235]));
        draw_filled_rect_mut(&mut frame, Rect::at(60, 100).of_size(400, 8), Rgb([20, 20, 20]));
        draw_filled_rect_mut(&mut frame, Rect::at(430, 280).of_size(90, 90), Rgb([30, 30, 30]));
        let wobble = (self.tick % 5) as i32;
        draw_filled_circle_mut(&mut frame, (180 + wobble, 300), 30, Rgb([200, 30, 30]));
        GrabResult::Frame(frame)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Usage: seg_vision <mode> [frame_count] [csv_output_path]");
        println!("Modes: lines, blobs, color, edges, contours, shapes, both");
        return Ok(());
    }
    let mode: AnalysisMode = args[1].parse()?;
    let frame_count: u32 = match args.get(2) {
        Some(raw) => raw.parse().context("frame_count must be an integer")?,
        None => 30,
    };

    let (run_tx, run_rx) = watch::channel(true);
    let (_mode_tx, mode_rx) = watch::channel(mode);
    let source = SyntheticSource {
        frames_left: frame_count,
        tick: 0,
        run_tx,
    };

    let runner = FeedRunner::new(
        source,
        VisionPipeline::new(PipelineConfig::default()),
        mode_rx,
        run_rx,
    )
    .with_tick(Duration::from_millis(10));

    let mut processed = 0u32;
    let pipeline = runner.run(|_display| processed += 1, |_plot| {}).await;

    println!("Processed {processed} frames in mode '{mode}'.");
    if let Some(sample) = pipeline.history().samples().last() {
        println!(
            "Last frame: {} lines, {} blobs.",
            sample.line_count, sample.blob_count
        );
    }

    if let Some(path) = args.get(3) {
        let file = File::create(path).with_context(|| format!("creating {path}"))?;
        let mut writer = BufWriter::new(file);
        pipeline.export_csv(&mut writer)?;
        println!("Metrics saved to {path}.");
    }
    Ok(())
}
