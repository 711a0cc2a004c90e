//! Telemetry sink and host observation for the Lumen backend.
//!
//! This crate provides:
//! - A document-store client for per-run telemetry records
//! - A sink abstraction whose failures degrade to warnings, never errors
//! - CPU/GPU utilization and device-spec observation helpers

pub mod client;
pub mod error;
pub mod sink;
pub mod system;

pub use client::{TelemetryClient, TelemetryConfig};
pub use error::{TelemetryError, TelemetryResult};
pub use sink::{HttpSink, MemorySink, RecordSink};
pub use system::{cpu_utilization, device_specs, gpu_utilization, SystemObservation};
