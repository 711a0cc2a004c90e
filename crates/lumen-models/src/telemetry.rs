//! Telemetry record written exactly once per pipeline run.
//!
//! The record is the run's permanent trace in the document store. It is
//! produced whether the run succeeds, crashes, or leaves no output behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::video::VideoMetadata;

/// Process category recorded for every run of this service.
pub const PROCESS_CATEGORY: &str = "Low Light Enhancement";

/// Terminal status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Error,
}

impl RunStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Hardware model names observed on the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSpecs {
    /// CPU model name.
    pub cpu: String,
    /// GPU model name, "None" when no GPU is visible.
    pub gpu: String,
}

/// Performance metrics measured by the orchestrator around the isolated run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Wall-clock time of the whole run, in seconds.
    pub total_time_secs: f64,
    /// Wall time divided by total source frames, in seconds.
    pub avg_delay_per_frame_secs: f64,
    /// CPU utilization percentage at record time.
    pub cpu_usage_percent: f64,
    /// GPU utilization percentage, absent without a visible GPU.
    pub gpu_usage_percent: Option<f64>,
    /// "GPU" or "CPU".
    pub device_used: String,
    /// Hardware model names.
    pub device_specs: DeviceSpecs,
}

/// One telemetry document per run attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub process_category: String,
    pub model_used: String,
    pub input_file: String,
    pub output_file: String,
    pub video: VideoMetadata,
    pub performance: PerformanceMetrics,
    pub status: RunStatus,
    pub error_message: Option<String>,
}

impl TelemetryRecord {
    /// Build a success record. `status` and `error_message` stay consistent.
    pub fn success(
        model_used: impl Into<String>,
        input_file: impl Into<String>,
        output_file: impl Into<String>,
        video: VideoMetadata,
        performance: PerformanceMetrics,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            process_category: PROCESS_CATEGORY.to_string(),
            model_used: model_used.into(),
            input_file: input_file.into(),
            output_file: output_file.into(),
            video,
            performance,
            status: RunStatus::Success,
            error_message: None,
        }
    }

    /// Build an error record with zero processed frames.
    pub fn failure(
        model_used: impl Into<String>,
        input_file: impl Into<String>,
        output_file: impl Into<String>,
        mut video: VideoMetadata,
        performance: PerformanceMetrics,
        error: impl Into<String>,
    ) -> Self {
        video.processed_frames = 0;
        Self {
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            process_category: PROCESS_CATEGORY.to_string(),
            model_used: model_used.into(),
            input_file: input_file.into(),
            output_file: output_file.into(),
            video,
            performance,
            status: RunStatus::Error,
            error_message: Some(error.into()),
        }
    }

    /// Check record-level consistency between status and error message.
    pub fn is_consistent(&self) -> bool {
        match self.status {
            RunStatus::Success => self.error_message.is_none(),
            RunStatus::Error => self.error_message.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_performance() -> PerformanceMetrics {
        PerformanceMetrics {
            total_time_secs: 4.2,
            avg_delay_per_frame_secs: 0.042,
            cpu_usage_percent: 35.0,
            gpu_usage_percent: None,
            device_used: "CPU".to_string(),
            device_specs: DeviceSpecs {
                cpu: "test-cpu".to_string(),
                gpu: "None".to_string(),
            },
        }
    }

    #[test]
    fn test_success_record_consistency() {
        let record = TelemetryRecord::success(
            "CLAHE",
            "in.mp4",
            "out.avi",
            VideoMetadata::new(10.0, 640, 480, 25.0, 250),
            sample_performance(),
        );
        assert_eq!(record.status, RunStatus::Success);
        assert!(record.error_message.is_none());
        assert!(record.is_consistent());
        assert_eq!(record.process_category, "Low Light Enhancement");
    }

    #[test]
    fn test_failure_record_zeroes_processed_frames() {
        let mut video = VideoMetadata::new(10.0, 640, 480, 25.0, 250);
        video.processed_frames = 50;
        let record = TelemetryRecord::failure(
            "UNet",
            "in.mp4",
            "out.avi",
            video,
            sample_performance(),
            "Output file missing.",
        );
        assert_eq!(record.status, RunStatus::Error);
        assert_eq!(record.video.processed_frames, 0);
        assert_eq!(record.error_message.as_deref(), Some("Output file missing."));
        assert!(record.is_consistent());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&RunStatus::Success).unwrap();
        assert_eq!(json, "\"success\"");
        let json = serde_json::to_string(&RunStatus::Error).unwrap();
        assert_eq!(json, "\"error\"");
    }
}
