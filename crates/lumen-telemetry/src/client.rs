//! Document-store client for telemetry records.
//!
//! Records are inserted as one JSON document per run into a REST
//! document store. When no store is configured the client is disabled and
//! records surface through tracing only, which keeps development hosts and
//! tests free of a store dependency.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info};

use lumen_models::TelemetryRecord;

use crate::error::{TelemetryError, TelemetryResult};

/// Default collection name for run documents.
pub const DEFAULT_COLLECTION: &str = "processing_logs";

/// Telemetry store configuration.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Base URL of the document store; `None` disables persistence.
    pub base_url: Option<String>,
    /// Collection the run documents are inserted into.
    pub collection: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            collection: DEFAULT_COLLECTION.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl TelemetryConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("TELEMETRY_URI").ok().filter(|s| !s.is_empty()),
            collection: std::env::var("TELEMETRY_COLLECTION")
                .unwrap_or_else(|_| DEFAULT_COLLECTION.to_string()),
            timeout: Duration::from_secs(
                std::env::var("TELEMETRY_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        }
    }
}

/// REST client for the telemetry document store.
#[derive(Debug, Clone)]
pub struct TelemetryClient {
    http: Client,
    config: TelemetryConfig,
}

impl TelemetryClient {
    /// Create a new client.
    pub fn new(config: TelemetryConfig) -> TelemetryResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("lumen-telemetry/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(TelemetryError::Network)?;

        if config.base_url.is_none() {
            info!("TELEMETRY_URI not set, telemetry persistence disabled");
        }

        Ok(Self { http, config })
    }

    /// True when a store endpoint is configured.
    pub fn is_enabled(&self) -> bool {
        self.config.base_url.is_some()
    }

    /// Insert one run document into the store.
    pub async fn insert(&self, record: &TelemetryRecord) -> TelemetryResult<()> {
        let Some(base_url) = &self.config.base_url else {
            debug!(run_id = %record.run_id, "Telemetry disabled, record not persisted");
            return Ok(());
        };

        let url = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            self.config.collection
        );

        let response = self.http.post(&url).json(record).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TelemetryError::request_failed(status.as_u16(), body));
        }

        debug!(run_id = %record.run_id, status = %record.status, "Telemetry record inserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_models::{DeviceSpecs, PerformanceMetrics, VideoMetadata};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_record() -> TelemetryRecord {
        TelemetryRecord::success(
            "CLAHE",
            "in.mp4",
            "out.avi",
            VideoMetadata::new(10.0, 640, 480, 25.0, 250),
            PerformanceMetrics {
                total_time_secs: 3.0,
                avg_delay_per_frame_secs: 0.012,
                cpu_usage_percent: 20.0,
                gpu_usage_percent: None,
                device_used: "CPU".to_string(),
                device_specs: DeviceSpecs {
                    cpu: "test".to_string(),
                    gpu: "None".to_string(),
                },
            },
        )
    }

    #[tokio::test]
    async fn test_insert_posts_one_document() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/processing_logs"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = TelemetryClient::new(TelemetryConfig {
            base_url: Some(server.uri()),
            ..Default::default()
        })
        .unwrap();

        client.insert(&sample_record()).await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_surfaces_store_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = TelemetryClient::new(TelemetryConfig {
            base_url: Some(server.uri()),
            ..Default::default()
        })
        .unwrap();

        let err = client.insert(&sample_record()).await.unwrap_err();
        assert!(matches!(err, TelemetryError::RequestFailed { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_disabled_client_accepts_records() {
        let client = TelemetryClient::new(TelemetryConfig::default()).unwrap();
        assert!(!client.is_enabled());
        client.insert(&sample_record()).await.unwrap();
    }
}
