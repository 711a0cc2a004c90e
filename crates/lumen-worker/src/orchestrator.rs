//! Run orchestrator.
//!
//! Launches one pipeline run as an isolated child process, parses its
//! machine-readable summary, folds in orchestrator-level observations and
//! emits exactly one telemetry record per invocation. A crash or resource
//! exhaustion inside model inference stays contained in the child; it reaches
//! this process only as an exit status and captured text.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::warn;

use lumen_media::probe::probe_video;
use lumen_models::{
    extract_processed_count, EnhanceMethod, MethodSelection, PerformanceMetrics, TelemetryRecord,
    VideoMetadata,
};
use lumen_telemetry::{RecordSink, SystemObservation};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::RunLogger;

/// Orchestrates isolated pipeline runs and their telemetry.
pub struct RunOrchestrator {
    config: WorkerConfig,
    sink: Arc<dyn RecordSink>,
}

impl RunOrchestrator {
    /// Create an orchestrator writing records into the given sink.
    pub fn new(config: WorkerConfig, sink: Arc<dyn RecordSink>) -> Self {
        Self { config, sink }
    }

    /// Process one video with the requested method.
    ///
    /// Returns the output path on success, `None` on failure; callers must
    /// treat `None` and an error telemetry record as the same condition.
    /// Exactly one telemetry record is emitted either way.
    pub async fn process_video(&self, input: &Path, method_raw: &str) -> Option<PathBuf> {
        let selection = EnhanceMethod::resolve(method_raw);
        if selection.fallback {
            warn!(
                requested = method_raw,
                "Unrecognized method, falling back to UNet"
            );
        }

        let logger = RunLogger::new(selection.model_label());
        let output = self.output_path(input, selection.method);
        logger.log_start(&format!(
            "{} -> {}",
            input.display(),
            output.display()
        ));

        let started = Instant::now();
        let outcome = self.run_isolated(selection.method, input, &output).await;
        let wall_secs = started.elapsed().as_secs_f64();

        // Orchestrator-level observations, independent of the pipeline.
        let video = match probe_video(input).await {
            Ok(info) => info.to_metadata(),
            Err(e) => {
                logger.log_warning(&format!("input probe failed: {e}"));
                VideoMetadata::unknown()
            }
        };
        let system = SystemObservation::capture().await;

        let outcome = outcome.and_then(|processed| {
            if output.exists() {
                Ok(processed)
            } else {
                Err(WorkerError::OutputMissing(output.clone()))
            }
        });

        match outcome {
            Ok(processed_frames) => {
                logger.log_completion(&format!(
                    "{processed_frames} frames processed in {wall_secs:.2}s"
                ));
                let record = self.success_record(
                    &selection,
                    input,
                    &output,
                    video,
                    &system,
                    wall_secs,
                    processed_frames,
                );
                self.sink.record(&record).await;
                Some(output)
            }
            Err(e) => {
                logger.log_error(&e.to_string());
                let record =
                    self.failure_record(&selection, input, &output, video, &system, &e);
                self.sink.record(&record).await;
                None
            }
        }
    }

    /// Output path for a run: `{output_dir}/processed_{method}_{stem}.avi`.
    pub fn output_path(&self, input: &Path, method: EnhanceMethod) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "video".to_string());
        self.config
            .output_dir
            .join(format!("processed_{}_{stem}.avi", method.as_str()))
    }

    /// Run the pipeline binary as an isolated child process.
    async fn run_isolated(
        &self,
        method: EnhanceMethod,
        input: &Path,
        output: &Path,
    ) -> WorkerResult<u64> {
        let bin = self.resolve_pipeline_bin(method)?;

        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut command = Command::new(&bin);
        command
            .arg(input)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let run = timeout(self.config.run_timeout, command.output());
        let child_output = match run.await {
            Err(_) => return Err(WorkerError::Timeout(self.config.run_timeout.as_secs())),
            Ok(result) => result.map_err(|e| WorkerError::unit_crash(None, &e.to_string()))?,
        };

        let stdout = String::from_utf8_lossy(&child_output.stdout);
        let stderr = String::from_utf8_lossy(&child_output.stderr);

        if !child_output.status.success() {
            return Err(WorkerError::unit_crash(
                child_output.status.code(),
                &stderr,
            ));
        }

        extract_processed_count(&stdout).ok_or(WorkerError::SummaryMissing)
    }

    /// Locate the pipeline executable for a method.
    fn resolve_pipeline_bin(&self, method: EnhanceMethod) -> WorkerResult<PathBuf> {
        let name = method.pipeline_bin();

        if let Some(dir) = &self.config.pipeline_bin_dir {
            let candidate = dir.join(name);
            return if candidate.exists() {
                Ok(candidate)
            } else {
                Err(WorkerError::PipelineBinMissing(
                    candidate.to_string_lossy().to_string(),
                ))
            };
        }

        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let candidate = dir.join(name);
                if candidate.exists() {
                    return Ok(candidate);
                }
            }
        }

        which::which(name).map_err(|_| WorkerError::PipelineBinMissing(name.to_string()))
    }

    #[allow(clippy::too_many_arguments)]
    fn success_record(
        &self,
        selection: &MethodSelection,
        input: &Path,
        output: &Path,
        mut video: VideoMetadata,
        system: &SystemObservation,
        wall_secs: f64,
        processed_frames: u64,
    ) -> TelemetryRecord {
        video.processed_frames = processed_frames;
        let avg_delay = if video.total_frames > 0 {
            wall_secs / video.total_frames as f64
        } else {
            0.0
        };

        TelemetryRecord::success(
            selection.model_label(),
            input.to_string_lossy(),
            output.to_string_lossy(),
            video,
            PerformanceMetrics {
                total_time_secs: wall_secs,
                avg_delay_per_frame_secs: avg_delay,
                cpu_usage_percent: system.cpu_usage_percent,
                gpu_usage_percent: system.gpu_usage_percent,
                device_used: system.device_used().to_string(),
                device_specs: system.device_specs.clone(),
            },
        )
    }

    fn failure_record(
        &self,
        selection: &MethodSelection,
        input: &Path,
        output: &Path,
        video: VideoMetadata,
        system: &SystemObservation,
        error: &WorkerError,
    ) -> TelemetryRecord {
        TelemetryRecord::failure(
            selection.model_label(),
            input.to_string_lossy(),
            output.to_string_lossy(),
            video,
            PerformanceMetrics {
                total_time_secs: 0.0,
                avg_delay_per_frame_secs: 0.0,
                cpu_usage_percent: system.cpu_usage_percent,
                gpu_usage_percent: system.gpu_usage_percent,
                device_used: system.device_used().to_string(),
                device_specs: system.device_specs.clone(),
            },
            error.to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_models::RunStatus;
    use lumen_telemetry::MemorySink;
    use std::time::Duration;

    fn orchestrator_with_bin_dir(
        bin_dir: PathBuf,
        output_dir: PathBuf,
    ) -> (RunOrchestrator, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let config = WorkerConfig {
            output_dir,
            pipeline_bin_dir: Some(bin_dir),
            run_timeout: Duration::from_secs(30),
        };
        (RunOrchestrator::new(config, sink.clone()), sink)
    }

    #[cfg(unix)]
    fn write_fake_pipeline(dir: &Path, name: &str, script: &str) {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_output_path_naming() {
        let (orchestrator, _) = orchestrator_with_bin_dir(
            PathBuf::from("/nonexistent"),
            PathBuf::from("processed_videos"),
        );
        let path = orchestrator.output_path(Path::new("/tmp/night_drive.mp4"), EnhanceMethod::Clahe);
        assert_eq!(
            path,
            PathBuf::from("processed_videos/processed_clahe_night_drive.avi")
        );
    }

    #[tokio::test]
    async fn test_missing_binary_emits_one_error_record() {
        let work = tempfile::tempdir().unwrap();
        let input = work.path().join("in.mp4");
        std::fs::write(&input, b"not a real video").unwrap();

        let (orchestrator, sink) = orchestrator_with_bin_dir(
            work.path().join("no-bins"),
            work.path().join("out"),
        );

        let result = orchestrator.process_video(&input, "clahe").await;
        assert!(result.is_none());

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, RunStatus::Error);
        assert_eq!(records[0].video.processed_frames, 0);
        assert_eq!(records[0].model_used, "CLAHE");
        assert!(records[0].error_message.is_some());
    }

    #[tokio::test]
    async fn test_unknown_method_records_fallback_label() {
        let work = tempfile::tempdir().unwrap();
        let input = work.path().join("in.mp4");
        std::fs::write(&input, b"x").unwrap();

        let (orchestrator, sink) = orchestrator_with_bin_dir(
            work.path().join("no-bins"),
            work.path().join("out"),
        );

        let result = orchestrator.process_video(&input, "foo").await;
        assert!(result.is_none());
        assert_eq!(sink.records()[0].model_used, "UNet (fallback)");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_unit_produces_success_record() {
        let work = tempfile::tempdir().unwrap();
        let bin_dir = work.path().join("bins");
        std::fs::create_dir_all(&bin_dir).unwrap();
        write_fake_pipeline(
            &bin_dir,
            "run-clahe",
            "#!/bin/sh\necho \"Processing complete.\"\necho \"PROCESSED_COUNT=7\"\n: > \"$2\"\n",
        );

        let input = work.path().join("in.mp4");
        std::fs::write(&input, b"x").unwrap();

        let (orchestrator, sink) =
            orchestrator_with_bin_dir(bin_dir, work.path().join("out"));

        let result = orchestrator.process_video(&input, "clahe").await;
        let output = result.expect("run should succeed");
        assert!(output.exists());

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, RunStatus::Success);
        assert_eq!(records[0].video.processed_frames, 7);
        assert!(records[0].error_message.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_declared_success_with_missing_output() {
        let work = tempfile::tempdir().unwrap();
        let bin_dir = work.path().join("bins");
        std::fs::create_dir_all(&bin_dir).unwrap();
        // Unit claims success but never writes the output file.
        write_fake_pipeline(&bin_dir, "run-unet", "#!/bin/sh\necho \"PROCESSED_COUNT=3\"\n");

        let input = work.path().join("in.mp4");
        std::fs::write(&input, b"x").unwrap();

        let (orchestrator, sink) =
            orchestrator_with_bin_dir(bin_dir, work.path().join("out"));

        let result = orchestrator.process_video(&input, "unet").await;
        assert!(result.is_none());

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, RunStatus::Error);
        assert_eq!(
            records[0].error_message.as_deref(),
            Some("Output file missing.")
        );
        assert_eq!(records[0].video.processed_frames, 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_crashing_unit_is_contained() {
        let work = tempfile::tempdir().unwrap();
        let bin_dir = work.path().join("bins");
        std::fs::create_dir_all(&bin_dir).unwrap();
        write_fake_pipeline(
            &bin_dir,
            "run-clahe",
            "#!/bin/sh\necho \"weights corrupt\" >&2\nexit 2\n",
        );

        let input = work.path().join("in.mp4");
        std::fs::write(&input, b"x").unwrap();

        let (orchestrator, sink) =
            orchestrator_with_bin_dir(bin_dir, work.path().join("out"));

        let result = orchestrator.process_video(&input, "clahe").await;
        assert!(result.is_none());

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, RunStatus::Error);
        let message = records[0].error_message.as_deref().unwrap();
        assert!(message.contains("weights corrupt"));
    }
}
