//! Error types for pipeline operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for pipeline operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Process exit code for setup failures (source open, weight load).
pub const EXIT_SETUP_FAILURE: i32 = 2;

/// Process exit code for failures while frames were being processed.
pub const EXIT_PROCESSING_FAILURE: i32 = 1;

/// Errors that can occur during pipeline processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Could not open input video: {0}")]
    SourceUnavailable(PathBuf),

    #[error("Failed to load model weights from {path}: {message}")]
    WeightLoad { path: PathBuf, message: String },

    #[error("Decode failed mid-run: {0}")]
    DecodeFailed(String),

    #[error("Encode failed: {0}")]
    EncodeFailed(String),

    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid video file: {0}")]
    InvalidVideo(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create a weight-load failure error.
    pub fn weight_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::WeightLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a decode failure error.
    pub fn decode_failed(message: impl Into<String>) -> Self {
        Self::DecodeFailed(message.into())
    }

    /// Create an encode failure error.
    pub fn encode_failed(message: impl Into<String>) -> Self {
        Self::EncodeFailed(message.into())
    }

    /// Create an inference failure error.
    pub fn inference_failed(message: impl Into<String>) -> Self {
        Self::InferenceFailed(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// True for failures that abort the run before any frame is processed.
    pub fn is_setup_failure(&self) -> bool {
        matches!(self, MediaError::WeightLoad { .. })
    }

    /// Exit code the pipeline binary reports for this error.
    ///
    /// Setup/weight-load failures are distinguished from processing failures
    /// so the orchestrator can tell them apart without parsing diagnostics.
    pub fn exit_code(&self) -> i32 {
        if self.is_setup_failure() {
            EXIT_SETUP_FAILURE
        } else {
            EXIT_PROCESSING_FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_mapping() {
        let err = MediaError::weight_load("model.onnx", "missing");
        assert!(err.is_setup_failure());
        assert_eq!(err.exit_code(), EXIT_SETUP_FAILURE);

        let err = MediaError::SourceUnavailable(PathBuf::from("in.mp4"));
        assert_eq!(err.exit_code(), EXIT_PROCESSING_FAILURE);

        let err = MediaError::decode_failed("truncated stream");
        assert_eq!(err.exit_code(), EXIT_PROCESSING_FAILURE);
    }
}
