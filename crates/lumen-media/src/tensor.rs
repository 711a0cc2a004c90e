//! Mat <-> NCHW tensor conversion for ONNX inference.
//!
//! Channel order is preserved as-is: the models were trained on tensors built
//! straight from the decoder's channel layout, so no swap happens here beyond
//! what the caller requests via explicit color conversion.

use opencv::core::{Mat, Scalar, CV_8UC3};
use opencv::prelude::*;

use crate::error::{MediaError, MediaResult};

/// Convert an 8-bit 3-channel Mat into a `[1, 3, H, W]` float tensor in [0, 1].
pub fn mat_to_nchw(mat: &Mat) -> MediaResult<(Vec<usize>, Vec<f32>)> {
    if mat.typ() != CV_8UC3 {
        return Err(MediaError::internal(format!(
            "expected CV_8UC3 input, got type {}",
            mat.typ()
        )));
    }

    let height = mat.rows() as usize;
    let width = mat.cols() as usize;
    let bytes = mat
        .data_bytes()
        .map_err(|e| MediaError::internal(format!("non-continuous Mat: {e}")))?;

    // HWC -> CHW with normalization to [0, 1]
    let mut chw_data: Vec<f32> = Vec::with_capacity(3 * height * width);
    for c in 0..3 {
        for y in 0..height {
            for x in 0..width {
                chw_data.push(f32::from(bytes[(y * width + x) * 3 + c]) / 255.0);
            }
        }
    }

    Ok((vec![1, 3, height, width], chw_data))
}

/// Convert a `[1, 3, H, W]` float tensor in [0, 1] back into an 8-bit Mat.
///
/// Values are clamped to the 8-bit range before rounding.
pub fn nchw_to_mat(data: &[f32], height: i32, width: i32) -> MediaResult<Mat> {
    let (h, w) = (height as usize, width as usize);
    if data.len() != 3 * h * w {
        return Err(MediaError::internal(format!(
            "tensor length {} does not match {}x{}x3",
            data.len(),
            height,
            width
        )));
    }

    let mut mat = Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::all(0.0))
        .map_err(|e| MediaError::internal(format!("Mat allocation: {e}")))?;
    let bytes = mat
        .data_bytes_mut()
        .map_err(|e| MediaError::internal(format!("Mat data access: {e}")))?;

    for c in 0..3 {
        for y in 0..h {
            for x in 0..w {
                let value = (data[c * h * w + y * w + x] * 255.0).clamp(0.0, 255.0);
                bytes[(y * w + x) * 3 + c] = value.round() as u8;
            }
        }
    }

    Ok(mat)
}
