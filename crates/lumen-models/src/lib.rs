//! Shared data models for the Lumen backend.
//!
//! This crate provides Serde-serializable types for:
//! - Enhancement method selection with fallback semantics
//! - Pipeline run summaries and the machine-readable summary contract
//! - Telemetry records written once per run
//! - Video metadata observed at the orchestrator level

pub mod method;
pub mod summary;
pub mod telemetry;
pub mod video;

// Re-export common types
pub use method::{EnhanceMethod, MethodSelection};
pub use summary::{extract_processed_count, summary_line, RunSummary, SUMMARY_KEY};
pub use telemetry::{DeviceSpecs, PerformanceMetrics, RunStatus, TelemetryRecord};
pub use video::VideoMetadata;
