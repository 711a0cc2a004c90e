//! Low-light enhancement worker binary.
//!
//! Usage: `lumen-worker <input_video> <method>`

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lumen_telemetry::{HttpSink, TelemetryClient, TelemetryConfig};
use lumen_worker::{RunOrchestrator, WorkerConfig};

#[tokio::main]
async fn main() -> ExitCode {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("lumen=info".parse().unwrap())
        .add_directive("ort=warn".parse().unwrap())
        .add_directive("onnxruntime=warn".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <input_video> <method>", args[0]);
        eprintln!("  method: clahe | unet");
        return ExitCode::from(1);
    }

    info!("Starting lumen-worker");

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let telemetry_config = TelemetryConfig::from_env();
    let client = match TelemetryClient::new(telemetry_config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create telemetry client: {}", e);
            return ExitCode::from(1);
        }
    };
    let sink = Arc::new(HttpSink::new(client));

    let orchestrator = RunOrchestrator::new(config, sink);

    match orchestrator.process_video(Path::new(&args[1]), &args[2]).await {
        Some(output) => {
            info!("Enhanced video written to {}", output.display());
            ExitCode::SUCCESS
        }
        None => ExitCode::from(1),
    }
}
