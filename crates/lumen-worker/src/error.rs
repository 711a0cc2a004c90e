//! Worker error types.

use std::path::PathBuf;
use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

/// Failures observed by the orchestrator around an isolated run.
///
/// Failures inside the isolated unit never cross the boundary as panics or
/// language-level errors; they arrive here as exit status plus captured text.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Pipeline unit failed (exit code {exit_code:?}): {stderr_tail}")]
    UnitCrash {
        exit_code: Option<i32>,
        stderr_tail: String,
    },

    #[error("Pipeline unit timed out after {0} seconds")]
    Timeout(u64),

    #[error("Output file missing.")]
    OutputMissing(PathBuf),

    #[error("Pipeline binary not found: {0}")]
    PipelineBinMissing(String),

    #[error("Pipeline unit reported no summary line")]
    SummaryMissing,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Media error: {0}")]
    Media(#[from] lumen_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    /// Create a unit crash error from captured process output.
    pub fn unit_crash(exit_code: Option<i32>, stderr: &str) -> Self {
        Self::UnitCrash {
            exit_code,
            stderr_tail: stderr_tail(stderr),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Keep the last few lines of captured stderr for diagnostics.
fn stderr_tail(stderr: &str) -> String {
    const MAX_LINES: usize = 5;
    let lines: Vec<&str> = stderr.lines().collect();
    let start = lines.len().saturating_sub(MAX_LINES);
    lines[start..].join("\n")
}
