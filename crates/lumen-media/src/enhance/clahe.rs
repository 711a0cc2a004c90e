//! Classical CLAHE enhancement.
//!
//! Contrast-limited adaptive histogram equalization applied to the luminance
//! channel only: BGR -> Lab, equalize L, merge, Lab -> BGR. Deterministic and
//! stateless, no learned weights.

use opencv::core::{merge, split, Mat, Size, Vector};
use opencv::imgproc::{self, COLOR_BGR2Lab, COLOR_Lab2BGR};
use opencv::prelude::*;

use crate::error::{MediaError, MediaResult};
use crate::enhance::Enhancer;

/// CLAHE clip limit.
pub const CLIP_LIMIT: f64 = 10.0;

/// CLAHE tile grid side length.
pub const TILE_GRID: i32 = 8;

/// Contrast-limited adaptive histogram equalization strategy.
#[derive(Debug, Default)]
pub struct ClaheEnhancer;

impl ClaheEnhancer {
    pub fn new() -> Self {
        Self
    }
}

impl Enhancer for ClaheEnhancer {
    fn label(&self) -> &'static str {
        "CLAHE"
    }

    fn enhance(&mut self, frame: &Mat) -> MediaResult<Mat> {
        let mut lab = Mat::default();
        imgproc::cvt_color(frame, &mut lab, COLOR_BGR2Lab, 0)
            .map_err(|e| MediaError::internal(format!("BGR->Lab: {e}")))?;

        let mut channels: Vector<Mat> = Vector::new();
        split(&lab, &mut channels).map_err(|e| MediaError::internal(format!("split: {e}")))?;

        let luminance = channels
            .get(0)
            .map_err(|e| MediaError::internal(format!("missing L channel: {e}")))?;

        let mut clahe = imgproc::create_clahe(CLIP_LIMIT, Size::new(TILE_GRID, TILE_GRID))
            .map_err(|e| MediaError::internal(format!("create CLAHE: {e}")))?;

        let mut equalized = Mat::default();
        clahe
            .apply(&luminance, &mut equalized)
            .map_err(|e| MediaError::internal(format!("CLAHE apply: {e}")))?;

        channels.set(0, equalized)
            .map_err(|e| MediaError::internal(format!("set L channel: {e}")))?;

        let mut merged = Mat::default();
        merge(&channels, &mut merged).map_err(|e| MediaError::internal(format!("merge: {e}")))?;

        let mut enhanced = Mat::default();
        imgproc::cvt_color(&merged, &mut enhanced, COLOR_Lab2BGR, 0)
            .map_err(|e| MediaError::internal(format!("Lab->BGR: {e}")))?;

        Ok(enhanced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, Vec3b, CV_8UC3};

    fn gradient_frame() -> Mat {
        let mut mat =
            Mat::new_rows_cols_with_default(32, 32, CV_8UC3, Scalar::all(0.0)).unwrap();
        for y in 0..32 {
            for x in 0..32 {
                let v = (y * 4 + x / 8) as u8;
                *mat.at_2d_mut::<Vec3b>(y, x).unwrap() = Vec3b::from([v, v, v]);
            }
        }
        mat
    }

    #[test]
    fn test_output_geometry_matches_input() {
        let frame = gradient_frame();
        let mut enhancer = ClaheEnhancer::new();
        let out = enhancer.enhance(&frame).unwrap();
        assert_eq!(out.rows(), frame.rows());
        assert_eq!(out.cols(), frame.cols());
        assert_eq!(out.typ(), frame.typ());
    }

    #[test]
    fn test_deterministic_for_identical_input() {
        let frame = gradient_frame();
        let mut enhancer = ClaheEnhancer::new();
        let a = enhancer.enhance(&frame).unwrap();
        let b = enhancer.enhance(&frame).unwrap();
        assert_eq!(a.data_bytes().unwrap(), b.data_bytes().unwrap());
    }

    #[test]
    fn test_input_not_mutated() {
        let frame = gradient_frame();
        let before = frame.data_bytes().unwrap().to_vec();
        let mut enhancer = ClaheEnhancer::new();
        let _ = enhancer.enhance(&frame).unwrap();
        assert_eq!(frame.data_bytes().unwrap(), before.as_slice());
    }
}
