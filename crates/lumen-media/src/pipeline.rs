//! Pipeline driver: decode -> sample -> classify -> enhance -> compose -> encode.
//!
//! One driver owns one run. Models are loaded during Initializing and live
//! for the run only; frames are processed strictly in decode order and the
//! output stream is append-only, so no locking is needed within a run.

use std::path::{Path, PathBuf};
use std::time::Instant;

use opencv::core::{Mat, Size};
use opencv::prelude::*;
use opencv::videoio::VideoWriter;
use tracing::{debug, error, info};

use lumen_models::{EnhanceMethod, RunSummary};

use crate::classifier::LightClassifier;
use crate::compositor::compose_side_by_side;
use crate::enhance::build_enhancer;
use crate::error::{MediaError, MediaResult};
use crate::sampler::FrameSampler;

/// Default frames discarded between two processed frames.
pub const DEFAULT_FRAME_SKIP: u32 = 4;

/// Four-character codec identifier for the output container.
pub const OUTPUT_FOURCC: [char; 4] = ['X', 'V', 'I', 'D'];

/// Per-run pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Frames discarded between two processed frames.
    pub frame_skip: u32,
    /// Path to the light-condition classifier ONNX weights.
    pub classifier_model: PathBuf,
    /// Path to the UNet restorer ONNX weights.
    pub restorer_model: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_skip: DEFAULT_FRAME_SKIP,
            classifier_model: PathBuf::from("models/classifier_convnext.onnx"),
            restorer_model: PathBuf::from("models/restorer_unet.onnx"),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            frame_skip: std::env::var("LUMEN_FRAME_SKIP")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.frame_skip),
            classifier_model: std::env::var("LUMEN_CLASSIFIER_MODEL")
                .map(PathBuf::from)
                .unwrap_or(defaults.classifier_model),
            restorer_model: std::env::var("LUMEN_RESTORER_MODEL")
                .map(PathBuf::from)
                .unwrap_or(defaults.restorer_model),
        }
    }

    /// Output frame rate for a given source rate.
    ///
    /// Floating-point division for both strategies; one consistent semantics
    /// rather than per-strategy rounding.
    pub fn output_fps(&self, source_fps: f64) -> f64 {
        source_fps / f64::from(self.frame_skip + 1)
    }
}

/// States of the pipeline run, logged at each transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Initializing,
    Streaming,
    Finalizing,
    Done,
    Failed,
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineState::Initializing => "initializing",
            PipelineState::Streaming => "streaming",
            PipelineState::Finalizing => "finalizing",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// Drives one enhancement run from source video to composite output.
pub struct PipelineDriver {
    config: PipelineConfig,
    method: EnhanceMethod,
}

impl PipelineDriver {
    /// Create a driver with the strategy fixed for the whole run.
    pub fn new(config: PipelineConfig, method: EnhanceMethod) -> Self {
        Self { config, method }
    }

    /// Run the full pipeline, returning the aggregate counters.
    ///
    /// On a mid-run decode failure the frames already encoded remain on disk
    /// but the run is reported as failed.
    pub fn run(&self, input: &Path, output: &Path) -> MediaResult<RunSummary> {
        match self.run_inner(input, output) {
            Ok(summary) => {
                debug!(state = %PipelineState::Done, "Pipeline state");
                Ok(summary)
            }
            Err(e) => {
                debug!(state = %PipelineState::Failed, "Pipeline state");
                error!(error = %e, "Pipeline run failed");
                Err(e)
            }
        }
    }

    fn run_inner(&self, input: &Path, output: &Path) -> MediaResult<RunSummary> {
        debug!(state = %PipelineState::Initializing, "Pipeline state");

        let mut sampler = FrameSampler::open(input, self.config.frame_skip)?;
        let mut classifier = LightClassifier::load(&self.config.classifier_model)?;
        let mut enhancer = build_enhancer(self.method, &self.config)?;

        let source_fps = sampler.fps();
        let output_fps = self.config.output_fps(source_fps);
        let composite_size = Size::new(sampler.width() * 2, sampler.height());

        let mut writer = open_writer(output, output_fps, composite_size)?;

        info!(
            input = %input.display(),
            output = %output.display(),
            strategy = enhancer.label(),
            frame_skip = self.config.frame_skip,
            source_fps,
            output_fps,
            "Starting enhancement run"
        );

        debug!(state = %PipelineState::Streaming, "Pipeline state");

        let mut frames_processed: u64 = 0;
        let mut frames_enhanced: u64 = 0;
        let mut total_processing_time = 0.0f64;

        while let Some(sampled) = sampler.next() {
            let sampled = sampled?;
            let frame_start = Instant::now();

            let classification = classifier.classify(&sampled.frame)?;

            // Well-lit frames pass through untouched: enhancement is skipped,
            // not applied with a null transform.
            let chosen = if classification.is_low_light {
                frames_enhanced += 1;
                enhancer.enhance(&sampled.frame)?
            } else {
                sampled.frame.try_clone().map_err(|e| {
                    MediaError::internal(format!("frame clone: {e}"))
                })?
            };

            let composite = compose_side_by_side(&sampled.frame, &chosen)?;
            writer
                .write(&composite)
                .map_err(|e| MediaError::encode_failed(format!("frame {}: {e}", sampled.index)))?;

            total_processing_time += frame_start.elapsed().as_secs_f64();
            frames_processed += 1;

            if frames_processed % 40 == 0 {
                debug!(
                    frames_processed,
                    frames_enhanced,
                    frames_seen = sampler.frames_seen(),
                    "Streaming progress"
                );
            }
        }

        debug!(state = %PipelineState::Finalizing, "Pipeline state");
        writer
            .release()
            .map_err(|e| MediaError::encode_failed(format!("writer flush: {e}")))?;

        let summary = RunSummary {
            frames_seen: sampler.frames_seen(),
            frames_processed,
            total_processing_time_secs: total_processing_time,
            output_path: output.to_path_buf(),
        };

        info!(
            frames_seen = summary.frames_seen,
            frames_processed = summary.frames_processed,
            frames_enhanced,
            total_processing_time_secs = summary.total_processing_time_secs,
            "Enhancement run complete"
        );

        Ok(summary)
    }
}

fn open_writer(output: &Path, fps: f64, size: Size) -> MediaResult<VideoWriter> {
    let [c1, c2, c3, c4] = OUTPUT_FOURCC;
    let fourcc = VideoWriter::fourcc(c1, c2, c3, c4)
        .map_err(|e| MediaError::encode_failed(format!("fourcc: {e}")))?;

    let writer = VideoWriter::new(&output.to_string_lossy(), fourcc, fps, size, true)
        .map_err(|e| MediaError::encode_failed(format!("open writer: {e}")))?;

    if !writer.is_opened().unwrap_or(false) {
        return Err(MediaError::encode_failed(format!(
            "could not open output for writing: {}",
            output.display()
        )));
    }

    Ok(writer)
}
