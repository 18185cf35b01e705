// End-to-end tests for the frame analysis pipeline, driven by synthetic
// frames so no camera or fixture files are needed.

use image::Rgb;
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use seg_vision::core_modules::blob_detector::detect_blobs;
use seg_vision::core_modules::line_detector::detect_lines;
use seg_vision::{AnalysisMode, Frame, PipelineConfig, VisionPipeline};

/// A frame with a long dark bar and a dark disc: the bar feeds the line
/// detector, the disc feeds the blob detector.
fn busy_frame() -> Frame {
    let mut frame = Frame::from_pixel(320, 240, Rgb([235, 235, 235]));
    draw_filled_rect_mut(&mut frame, Rect::at(40, 60).of_size(240, 8), Rgb([20, 20, 20]));
    draw_filled_circle_mut(&mut frame, (160, 170), 25, Rgb([20, 20, 20]));
    frame
}

fn uniform_frame() -> Frame {
    Frame::from_pixel(320, 240, Rgb([235, 235, 235]))
}

#[test]
fn every_mode_records_one_sample_with_applicable_counts() {
    let frame = busy_frame();
    for mode in AnalysisMode::ALL {
        let mut pipeline = VisionPipeline::new(PipelineConfig::default());
        let (display, sample) = pipeline.process(&frame, mode, 42.5);
        assert_eq!(pipeline.history().len(), 1, "mode {mode}");
        assert_eq!(sample.timestamp, 42.5);
        assert_eq!(display.dimensions(), frame.dimensions());
        match mode {
            AnalysisMode::Lines => assert_eq!(sample.blob_count, 0),
            AnalysisMode::Blobs => assert_eq!(sample.line_count, 0),
            AnalysisMode::Both => {}
            _ => assert_eq!((sample.line_count, sample.blob_count), (0, 0)),
        }
    }
}

#[test]
fn line_mode_finds_the_bar_and_nothing_on_blank_frames() {
    let mut pipeline = VisionPipeline::new(PipelineConfig::default());
    let (_, sample) = pipeline.process(&busy_frame(), AnalysisMode::Lines, 0.0);
    assert!(sample.line_count >= 1);

    let (_, blank_sample) = pipeline.process(&uniform_frame(), AnalysisMode::Lines, 1.0);
    assert_eq!(blank_sample.line_count, 0);
}

#[test]
fn blob_mode_finds_the_disc() {
    let mut pipeline = VisionPipeline::new(PipelineConfig::default());
    let (_, sample) = pipeline.process(&busy_frame(), AnalysisMode::Blobs, 0.0);
    assert!(sample.blob_count >= 1);
}

#[test]
fn composite_mode_grows_both_series_once_per_frame() {
    let config = PipelineConfig::default();
    let frame = busy_frame();
    let n = 5;

    let mut pipeline = VisionPipeline::new(config.clone());
    for i in 0..n {
        pipeline.process(&frame, AnalysisMode::Both, i as f64);
    }
    assert_eq!(pipeline.history().line_series().len(), n);
    assert_eq!(pipeline.history().blob_series().len(), n);
    assert_eq!(pipeline.history().len(), n);

    // The recorded counts match what the primitives report independently.
    let (_, expected_lines) = detect_lines(&frame);
    let (_, expected_blobs) = detect_blobs(&frame, &config.blob_detector);
    for sample in pipeline.history().samples() {
        assert_eq!(sample.line_count, expected_lines);
        assert_eq!(sample.blob_count, expected_blobs);
    }
    assert!(pipeline.history().line_series().iter().all(|&c| c == expected_lines));
    assert!(pipeline.history().blob_series().iter().all(|&c| c == expected_blobs));
}

#[test]
fn composite_display_is_the_equal_blend_of_both_overlays() {
    let config = PipelineConfig::default();
    let frame = busy_frame();
    let mut pipeline = VisionPipeline::new(config.clone());
    let (display, _) = pipeline.process(&frame, AnalysisMode::Both, 0.0);

    let (line_frame, _) = detect_lines(&frame);
    let (blob_frame, _) = detect_blobs(&frame, &config.blob_detector);
    let sampled = [(0u32, 0u32), (160, 60), (160, 170), (319, 239)];
    for (x, y) in sampled {
        let expect: Vec<u8> = line_frame
            .get_pixel(x, y)
            .0
            .iter()
            .zip(blob_frame.get_pixel(x, y).0.iter())
            .map(|(&a, &b)| ((a as u16 + b as u16) / 2) as u8)
            .collect();
        assert_eq!(display.get_pixel(x, y).0.to_vec(), expect, "pixel ({x},{y})");
    }
}

#[test]
fn deterministic_modes_are_idempotent() {
    let frame = busy_frame();
    for mode in [
        AnalysisMode::Lines,
        AnalysisMode::Blobs,
        AnalysisMode::Color,
        AnalysisMode::Edges,
        AnalysisMode::Contours,
        AnalysisMode::Shapes,
    ] {
        let mut first = VisionPipeline::new(PipelineConfig::default());
        let mut second = VisionPipeline::new(PipelineConfig::default());
        let (display_a, sample_a) = first.process(&frame, mode, 7.0);
        let (display_b, sample_b) = second.process(&frame, mode, 7.0);
        assert_eq!(sample_a, sample_b, "mode {mode}");
        assert_eq!(display_a, display_b, "mode {mode}");
    }
}

#[test]
fn export_round_trips_every_appended_sample() {
    let mut pipeline = VisionPipeline::new(PipelineConfig::default());
    let frame = uniform_frame();
    let timestamps = [10.0, 10.25, 10.5, 10.75];
    for (i, ts) in timestamps.iter().enumerate() {
        let mode = if i % 2 == 0 { AnalysisMode::Edges } else { AnalysisMode::Both };
        pipeline.process(&frame, mode, *ts);
    }

    let mut buf = Vec::new();
    pipeline.export_csv(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), timestamps.len() + 1);
    assert_eq!(lines[0], "Timestamp,Line Count,Blob Count");
    for (row, ts) in lines[1..].iter().zip(timestamps.iter()) {
        let fields: Vec<&str> = row.split(',').collect();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].parse::<f64>().unwrap(), *ts);
        fields[1].parse::<u32>().unwrap();
        fields[2].parse::<u32>().unwrap();
    }
}

#[test]
fn plot_rendering_matches_configured_size() {
    let config = PipelineConfig {
        plot_width: 250,
        plot_height: 500,
        ..PipelineConfig::default()
    };
    let mut pipeline = VisionPipeline::new(config);
    pipeline.process(&busy_frame(), AnalysisMode::Both, 0.0);
    let plot = pipeline.render_plots();
    assert_eq!(plot.dimensions(), (250, 500));
}

#[test]
fn mode_switching_needs_no_reset() {
    let mut pipeline = VisionPipeline::new(PipelineConfig::default());
    let frame = busy_frame();
    let schedule = [
        AnalysisMode::Both,
        AnalysisMode::Lines,
        AnalysisMode::Both,
        AnalysisMode::Shapes,
        AnalysisMode::Both,
    ];
    for (i, mode) in schedule.into_iter().enumerate() {
        pipeline.process(&frame, mode, i as f64);
    }
    assert_eq!(pipeline.history().len(), schedule.len());
    // Three composite frames, three series points.
    assert_eq!(pipeline.history().line_series().len(), 3);
    assert_eq!(pipeline.history().blob_series().len(), 3);
}
