// THEORY:
// The `metrics` module is the pipeline's memory. Every processed frame leaves
// exactly one `MetricSample` behind, whatever the active mode was, and the
// composite mode additionally grows two rolling per-frame count series that
// feed the live plots.
//
// Key architectural principles:
// 1.  **Owned, explicit history**: `MetricsHistory` is a plain struct the
//     pipeline owns and threads through its calls. There is no ambient global
//     array; whoever holds the pipeline holds the history.
// 2.  **Append-only, atomic per frame**: a sample is either fully appended or
//     not appended at all. Nothing is trimmed, compacted or reset for the
//     lifetime of a run.
// 3.  **Dumb export**: the CSV writer serializes what is there, in append
//     order, and nothing else. Choosing or cancelling a destination is the
//     caller's business; an unused history simply never gets written.

use std::io::{self, Write};

/// Per-frame metrics record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSample {
    /// Wall-clock seconds at processing time.
    pub timestamp: f64,
    /// Detected line segments, 0 when the active mode computed none.
    pub line_count: u32,
    /// Detected blob keypoints, 0 when the active mode computed none.
    pub blob_count: u32,
}

/// Append-only log of per-frame samples plus the two rolling count series
/// grown only while the composite mode is active.
#[derive(Debug, Clone, Default)]
pub struct MetricsHistory {
    samples: Vec<MetricSample>,
    line_series: Vec<u32>,
    blob_series: Vec<u32>,
}

impl MetricsHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one sample. O(1) amortized, never rejects.
    pub fn append(&mut self, sample: MetricSample) {
        self.samples.push(sample);
    }

    /// Appends one point to each rolling series. Called once per composite
    /// frame, never for other modes.
    pub fn append_series(&mut self, line_count: u32, blob_count: u32) {
        self.line_series.push(line_count);
        self.blob_series.push(blob_count);
    }

    /// Every sample appended so far, in append order.
    pub fn samples(&self) -> &[MetricSample] {
        &self.samples
    }

    pub fn line_series(&self) -> &[u32] {
        &self.line_series
    }

    pub fn blob_series(&self) -> &[u32] {
        &self.blob_series
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Writes the full history as delimited text: a header row followed by
    /// one row per sample. All fields are numeric, so no quoting is needed.
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "Timestamp,Line Count,Blob Count")?;
        for sample in &self.samples {
            writeln!(
                writer,
                "{},{},{}",
                sample.timestamp, sample.line_count, sample.blob_count
            )?;
        }
        Ok(())
    }
}
