//! Structured run logging.
//!
//! Carries a run id and model label through every orchestrator log line so
//! concurrent runs stay distinguishable.

use tracing::{error, info, warn};
use uuid::Uuid;

/// Run logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    model: String,
}

impl RunLogger {
    /// Create a logger for one run of the given model.
    pub fn new(model: &str) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            model: model.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(run_id = %self.run_id, model = %self.model, "Run started: {}", message);
    }

    pub fn log_progress(&self, message: &str) {
        info!(run_id = %self.run_id, model = %self.model, "Run progress: {}", message);
    }

    pub fn log_warning(&self, message: &str) {
        warn!(run_id = %self.run_id, model = %self.model, "Run warning: {}", message);
    }

    pub fn log_error(&self, message: &str) {
        error!(run_id = %self.run_id, model = %self.model, "Run error: {}", message);
    }

    pub fn log_completion(&self, message: &str) {
        info!(run_id = %self.run_id, model = %self.model, "Run completed: {}", message);
    }

    /// Get the run id.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_logger_ids_are_unique() {
        let a = RunLogger::new("CLAHE");
        let b = RunLogger::new("CLAHE");
        assert_ne!(a.run_id(), b.run_id());
    }
}
