//! Learned UNet restoration strategy.
//!
//! Runs a restoration network over a fixed 512x512 input and rescales the
//! result back to the original frame dimensions. Loads its own weights,
//! independent of the classifier's.

use std::path::Path;

use opencv::core::{Mat, Size};
use opencv::imgproc::{self, INTER_LINEAR};
use opencv::prelude::*;
use ort::session::Session;
use ort::value::{Tensor, Value};
use tracing::info;

use crate::error::{MediaError, MediaResult};
use crate::enhance::Enhancer;
use crate::onnx::{create_session, OUTPUT_NAME};
use crate::tensor::{mat_to_nchw, nchw_to_mat};

/// Fixed square input resolution of the restoration network.
pub const RESTORER_INPUT_SIZE: i32 = 512;

/// UNet image restoration strategy.
pub struct UnetEnhancer {
    session: Session,
}

impl UnetEnhancer {
    /// Load restorer weights. Failure here is fatal to the run.
    pub fn load(model_path: &Path) -> MediaResult<Self> {
        let session = create_session(model_path)?;
        info!(model = %model_path.display(), "UNet restorer initialized");
        Ok(Self { session })
    }

    fn forward(&mut self, input: Value) -> MediaResult<Vec<f32>> {
        let outputs = self
            .session
            .run(ort::inputs![input])
            .map_err(|e| MediaError::inference_failed(format!("restorer forward pass: {e}")))?;

        let output = outputs
            .get(OUTPUT_NAME)
            .ok_or_else(|| MediaError::inference_failed("restorer output tensor missing"))?;

        let tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| MediaError::inference_failed(format!("extract restorer output: {e}")))?;

        Ok(tensor.1.iter().copied().collect())
    }
}

impl Enhancer for UnetEnhancer {
    fn label(&self) -> &'static str {
        "UNet"
    }

    fn enhance(&mut self, frame: &Mat) -> MediaResult<Mat> {
        let original_size = Size::new(frame.cols(), frame.rows());

        let mut resized = Mat::default();
        imgproc::resize(
            frame,
            &mut resized,
            Size::new(RESTORER_INPUT_SIZE, RESTORER_INPUT_SIZE),
            0.0,
            0.0,
            INTER_LINEAR,
        )
        .map_err(|e| MediaError::inference_failed(format!("restorer resize: {e}")))?;

        let (shape, data) = mat_to_nchw(&resized)?;
        let input = Tensor::from_array((shape, data.into_boxed_slice()))
            .map(Value::from)
            .map_err(|e| MediaError::inference_failed(format!("failed to create tensor: {e}")))?;

        let restored = self.forward(input)?;
        let restored_mat = nchw_to_mat(&restored, RESTORER_INPUT_SIZE, RESTORER_INPUT_SIZE)?;

        // Back to the original geometry for compositing.
        let mut output = Mat::default();
        imgproc::resize(&restored_mat, &mut output, original_size, 0.0, 0.0, INTER_LINEAR)
            .map_err(|e| MediaError::inference_failed(format!("restorer upscale: {e}")))?;

        Ok(output)
    }
}
