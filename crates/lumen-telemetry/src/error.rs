//! Telemetry error types.

use thiserror::Error;

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Errors that can occur while persisting telemetry records.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Insert rejected with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TelemetryError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn request_failed(status: u16, body: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            body: body.into(),
        }
    }
}
