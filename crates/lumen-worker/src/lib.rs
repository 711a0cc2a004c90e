//! Run orchestrator for the Lumen backend.
//!
//! This crate provides:
//! - Process-isolated execution of the enhancement pipeline binaries
//! - The machine-readable summary handshake with those binaries
//! - Exactly one telemetry record per run attempt, success or failure

pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::RunLogger;
pub use orchestrator::RunOrchestrator;
