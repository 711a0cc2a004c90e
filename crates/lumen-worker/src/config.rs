//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Run orchestrator configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Directory processed videos are written into.
    pub output_dir: PathBuf,
    /// Explicit directory holding the pipeline binaries; when unset they are
    /// resolved next to the current executable, then on PATH.
    pub pipeline_bin_dir: Option<PathBuf>,
    /// Wall-clock limit for one isolated run.
    pub run_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("processed_videos"),
            pipeline_bin_dir: None,
            run_timeout: Duration::from_secs(3600),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            output_dir: std::env::var("LUMEN_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("processed_videos")),
            pipeline_bin_dir: std::env::var("LUMEN_PIPELINE_BIN_DIR")
                .ok()
                .map(PathBuf::from),
            run_timeout: Duration::from_secs(
                std::env::var("LUMEN_RUN_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3600),
            ),
        }
    }
}
