// THEORY:
// The `plot` module is the visualization feed: a read-only consumer of the
// metrics history that renders the two rolling count series as stacked
// time-series panels. It is redrawn after every processed frame; since the
// series only grow in composite mode, frames processed under other modes
// simply re-render the same curves.
//
// The renderer targets a plain `Frame` so the caller can hand the raster to
// whatever surface it already displays frames on. Nothing here knows about
// windows or widgets.

use crate::Frame;
use crate::core_modules::draw;
use crate::core_modules::metrics::MetricsHistory;
use image::Rgb;
use imageproc::drawing::draw_line_segment_mut;

/// Line-count series color.
const LINE_SERIES_COLOR: Rgb<u8> = Rgb([220, 40, 40]);
/// Blob-count series color.
const BLOB_SERIES_COLOR: Rgb<u8> = Rgb([40, 40, 220]);
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS_COLOR: Rgb<u8> = Rgb([40, 40, 40]);
/// Inner margin between the panel border and the plotted curve.
const MARGIN: u32 = 8;
const TITLE_SCALE: u32 = 1;

pub const DEFAULT_PLOT_WIDTH: u32 = 400;
pub const DEFAULT_PLOT_HEIGHT: u32 = 640;

/// Renders both rolling series as two stacked panels: line counts on top,
/// blob counts below. Empty series render as titled, empty axes.
pub fn render(history: &MetricsHistory, width: u32, height: u32) -> Frame {
    let width = width.max(64);
    let height = height.max(64);
    let mut canvas = Frame::from_pixel(width, height, BACKGROUND);
    let panel_height = height / 2;
    draw_panel(
        &mut canvas,
        0,
        panel_height,
        history.line_series(),
        LINE_SERIES_COLOR,
        "Line Detection Count",
    );
    draw_panel(
        &mut canvas,
        panel_height,
        height - panel_height,
        history.blob_series(),
        BLOB_SERIES_COLOR,
        "Blob Detection Count",
    );
    canvas
}

fn draw_panel(
    canvas: &mut Frame,
    top: u32,
    height: u32,
    series: &[u32],
    color: Rgb<u8>,
    title: &str,
) {
    let width = canvas.width();
    draw_axes(canvas, top, width, height);
    draw::draw_text(
        canvas,
        title,
        MARGIN as i32 + 2,
        top as i32 + 2,
        TITLE_SCALE,
        AXIS_COLOR,
    );

    if series.is_empty() || width <= 2 * MARGIN || height <= 2 * MARGIN {
        return;
    }

    let title_band = draw::text_height(TITLE_SCALE) + 4;
    let inner_w = (width - 2 * MARGIN) as f32;
    let inner_h = (height - 2 * MARGIN - title_band) as f32;
    let inner_top = (top + MARGIN + title_band) as f32;
    let max = series.iter().copied().max().unwrap_or(0).max(1) as f32;
    let step = if series.len() > 1 {
        inner_w / (series.len() - 1) as f32
    } else {
        0.0
    };

    let point = |i: usize, v: u32| -> (f32, f32) {
        (
            MARGIN as f32 + step * i as f32,
            inner_top + inner_h * (1.0 - v as f32 / max),
        )
    };

    if series.len() == 1 {
        let (x, y) = point(0, series[0]);
        draw_line_segment_mut(canvas, (x - 1.0, y), (x + 1.0, y), color);
        return;
    }
    for i in 1..series.len() {
        draw_line_segment_mut(canvas, point(i - 1, series[i - 1]), point(i, series[i]), color);
    }
}

fn draw_axes(canvas: &mut Frame, top: u32, width: u32, height: u32) {
    let (x0, y0) = (0.0, top as f32);
    let (x1, y1) = ((width - 1) as f32, (top + height - 1) as f32);
    draw_line_segment_mut(canvas, (x0, y0), (x1, y0), AXIS_COLOR);
    draw_line_segment_mut(canvas, (x0, y1), (x1, y1), AXIS_COLOR);
    draw_line_segment_mut(canvas, (x0, y0), (x0, y1), AXIS_COLOR);
    draw_line_segment_mut(canvas, (x1, y0), (x1, y1), AXIS_COLOR);
}
