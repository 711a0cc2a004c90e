//! Record sink abstraction.
//!
//! The orchestrator emits exactly one record per run through a sink. A sink
//! never fails the caller: persistence problems are logged and swallowed so
//! the in-memory record stays available regardless of store health.

use async_trait::async_trait;
use std::sync::Mutex;
use tracing::warn;

use lumen_models::TelemetryRecord;

use crate::client::TelemetryClient;

/// Destination for per-run telemetry records.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Accept one record. Must not fail the caller.
    async fn record(&self, record: &TelemetryRecord);
}

/// Sink backed by the document-store client.
///
/// Insert failures degrade to a console warning; they never abort the run.
pub struct HttpSink {
    client: TelemetryClient,
}

impl HttpSink {
    pub fn new(client: TelemetryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecordSink for HttpSink {
    async fn record(&self, record: &TelemetryRecord) {
        if let Err(e) = self.client.insert(record).await {
            warn!(run_id = %record.run_id, error = %e, "Failed to persist telemetry record");
        }
    }
}

/// In-memory sink for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<TelemetryRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records received so far.
    pub fn records(&self) -> Vec<TelemetryRecord> {
        self.records.lock().expect("sink lock poisoned").clone()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn record(&self, record: &TelemetryRecord) {
        self.records
            .lock()
            .expect("sink lock poisoned")
            .push(record.clone());
    }
}
