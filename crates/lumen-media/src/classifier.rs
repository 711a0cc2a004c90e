//! Per-frame light-condition classification.
//!
//! A ConvNeXt backbone with a single-logit binary head, exported to ONNX.
//! The classifier is loaded once per pipeline run and reused for every frame;
//! per-frame calls are pure given fixed weights.

use std::path::Path;

use opencv::core::{Mat, Size};
use opencv::imgproc::{self, COLOR_BGR2RGB, INTER_LINEAR};
use opencv::prelude::*;
use ort::session::Session;
use ort::value::{Tensor, Value};
use tracing::info;

use crate::error::{MediaError, MediaResult};
use crate::onnx::{create_session, OUTPUT_NAME};
use crate::tensor::mat_to_nchw;

/// Fixed square input resolution of the classifier network.
pub const CLASSIFIER_INPUT_SIZE: i32 = 360;

/// Decision threshold on the sigmoid confidence.
pub const DECISION_THRESHOLD: f32 = 0.5;

/// Result of classifying a single frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    /// True when the frame needs enhancement.
    pub is_low_light: bool,
    /// Sigmoid confidence in [0, 1]. Invariant: `is_low_light == (confidence >= 0.5)`.
    pub confidence: f32,
}

impl Classification {
    /// Derive the decision from a confidence score.
    pub fn from_confidence(confidence: f32) -> Self {
        Self {
            is_low_light: confidence >= DECISION_THRESHOLD,
            confidence,
        }
    }
}

/// Binary low-light classifier over single frames.
pub struct LightClassifier {
    session: Session,
}

impl LightClassifier {
    /// Load classifier weights. Failure here is fatal to the run.
    pub fn load(model_path: &Path) -> MediaResult<Self> {
        let session = create_session(model_path)?;
        info!(model = %model_path.display(), "Light-condition classifier initialized");
        Ok(Self { session })
    }

    /// Classify one BGR frame.
    pub fn classify(&mut self, frame: &Mat) -> MediaResult<Classification> {
        let input = self.preprocess(frame)?;

        let outputs = self
            .session
            .run(ort::inputs![input])
            .map_err(|e| MediaError::inference_failed(format!("classifier forward pass: {e}")))?;

        let output = outputs
            .get(OUTPUT_NAME)
            .ok_or_else(|| MediaError::inference_failed("classifier output tensor missing"))?;

        let tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| MediaError::inference_failed(format!("extract classifier output: {e}")))?;

        let logit = tensor
            .1
            .first()
            .copied()
            .ok_or_else(|| MediaError::inference_failed("empty classifier output"))?;

        Ok(Classification::from_confidence(sigmoid(logit)))
    }

    /// Resize to the fixed square input, convert BGR to RGB, scale to [0, 1].
    fn preprocess(&self, frame: &Mat) -> MediaResult<Value> {
        let mut resized = Mat::default();
        imgproc::resize(
            frame,
            &mut resized,
            Size::new(CLASSIFIER_INPUT_SIZE, CLASSIFIER_INPUT_SIZE),
            0.0,
            0.0,
            INTER_LINEAR,
        )
        .map_err(|e| MediaError::inference_failed(format!("classifier resize: {e}")))?;

        let mut rgb = Mat::default();
        imgproc::cvt_color(&resized, &mut rgb, COLOR_BGR2RGB, 0)
            .map_err(|e| MediaError::inference_failed(format!("BGR->RGB: {e}")))?;

        let (shape, data) = mat_to_nchw(&rgb)?;
        Tensor::from_array((shape, data.into_boxed_slice()))
            .map(Value::from)
            .map_err(|e| MediaError::inference_failed(format!("failed to create tensor: {e}")))
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_matches_threshold() {
        let c = Classification::from_confidence(0.5);
        assert!(c.is_low_light);
        let c = Classification::from_confidence(0.49);
        assert!(!c.is_low_light);
        let c = Classification::from_confidence(0.93);
        assert!(c.is_low_light);
    }

    #[test]
    fn test_sigmoid_bounds() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert!(sigmoid(20.0) > 0.999);
        assert!(sigmoid(-20.0) < 0.001);
    }
}
