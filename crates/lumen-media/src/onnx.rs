//! ONNX Runtime session construction.
//!
//! Shared by the light-condition classifier and the UNet restorer. Execution
//! provider selection:
//! - CUDA on Linux with NVIDIA GPU (when `cuda` feature enabled)
//! - CoreML on macOS with Apple Silicon
//! - CPU fallback on all platforms

use std::path::Path;

use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use tracing::info;

use crate::error::{MediaError, MediaResult};

/// Load an ONNX model into a session, selecting the best available provider.
///
/// Missing or unreadable weights are a fatal setup failure for the run.
pub fn create_session(model_path: &Path) -> MediaResult<Session> {
    if !model_path.exists() {
        return Err(MediaError::weight_load(model_path, "model file not found"));
    }

    let model_bytes = std::fs::read(model_path)
        .map_err(|e| MediaError::weight_load(model_path, format!("failed to read model: {e}")))?;

    let mut builder = Session::builder()
        .map_err(|e| MediaError::weight_load(model_path, format!("session builder: {e}")))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| MediaError::weight_load(model_path, format!("optimization level: {e}")))?;

    // Try CUDA on Linux with cuda feature
    #[cfg(all(target_os = "linux", feature = "cuda"))]
    {
        use ort::execution_providers::CUDAExecutionProvider;
        if let Ok(cuda_builder) = builder
            .clone()
            .with_execution_providers([CUDAExecutionProvider::default().build()])
        {
            if let Ok(session) = cuda_builder.commit_from_memory(&model_bytes) {
                info!(model = %model_path.display(), "Using CUDA execution provider");
                return Ok(session);
            }
        }
        tracing::debug!("CUDA execution provider not available, trying alternatives");
    }

    // Try CoreML on macOS
    #[cfg(target_os = "macos")]
    {
        use ort::execution_providers::CoreMLExecutionProvider;
        if let Ok(coreml_builder) = builder
            .clone()
            .with_execution_providers([CoreMLExecutionProvider::default().build()])
        {
            if let Ok(session) = coreml_builder.commit_from_memory(&model_bytes) {
                info!(model = %model_path.display(), "Using CoreML execution provider");
                return Ok(session);
            }
        }
        tracing::debug!("CoreML execution provider not available, using CPU");
    }

    info!(model = %model_path.display(), "Using CPU execution provider");
    builder
        .commit_from_memory(&model_bytes)
        .map_err(|e| MediaError::weight_load(model_path, format!("failed to load ONNX model: {e}")))
}

/// Name of the single output tensor our exported models declare.
///
/// Both the classifier and the restorer are exported with `output_names=["output"]`.
pub const OUTPUT_NAME: &str = "output";
