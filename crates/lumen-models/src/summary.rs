//! Pipeline run summary and the machine-readable summary contract.
//!
//! The pipeline binary prints one line of the exact form
//! `PROCESSED_COUNT=<integer>` on stdout. That line is the only output the
//! orchestrator parses programmatically; everything else is diagnostics.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Key of the machine-readable summary line.
pub const SUMMARY_KEY: &str = "PROCESSED_COUNT";

/// Aggregate counters for one successful pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Total frames decoded from the source.
    pub frames_seen: u64,
    /// Frames that passed the temporal subsampling gate.
    pub frames_processed: u64,
    /// Accumulated per-frame processing time in seconds.
    pub total_processing_time_secs: f64,
    /// Path of the encoded side-by-side output.
    pub output_path: PathBuf,
}

impl RunSummary {
    /// Expected processed-frame count for a given skip value.
    ///
    /// For all skip >= 0: `ceil(frames_seen / (skip + 1))`.
    pub fn expected_processed(frames_seen: u64, frame_skip: u32) -> u64 {
        let step = u64::from(frame_skip) + 1;
        frames_seen.div_ceil(step)
    }

    /// Average processing time per processed frame, in seconds.
    pub fn avg_time_per_frame_secs(&self) -> f64 {
        if self.frames_processed == 0 {
            0.0
        } else {
            self.total_processing_time_secs / self.frames_processed as f64
        }
    }

    /// Render the machine-readable summary line for this run.
    pub fn summary_line(&self) -> String {
        summary_line(self.frames_processed)
    }
}

/// Render the machine-readable summary line.
pub fn summary_line(frames_processed: u64) -> String {
    format!("{SUMMARY_KEY}={frames_processed}")
}

/// Extract the processed-frame count from captured pipeline stdout.
///
/// Returns `None` when no well-formed summary line is present.
pub fn extract_processed_count(stdout: &str) -> Option<u64> {
    stdout
        .lines()
        .filter_map(|line| line.trim().strip_prefix(SUMMARY_KEY))
        .filter_map(|rest| rest.strip_prefix('='))
        .find_map(|value| value.trim().parse().ok())
}
