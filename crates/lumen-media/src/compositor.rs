//! Side-by-side frame compositing.

use opencv::core::{hconcat2, Mat};
use opencv::prelude::*;

use crate::error::{MediaError, MediaResult};

/// Horizontally concatenate the original and the chosen output frame.
///
/// Pure function: allocates the composite, never mutates its inputs. Both
/// frames must share geometry and pixel type; enhancement strategies resize
/// their output back to the original dimensions before this point.
pub fn compose_side_by_side(original: &Mat, enhanced: &Mat) -> MediaResult<Mat> {
    if original.rows() != enhanced.rows()
        || original.cols() != enhanced.cols()
        || original.typ() != enhanced.typ()
    {
        return Err(MediaError::internal(format!(
            "composite geometry mismatch: {}x{} type {} vs {}x{} type {}",
            original.cols(),
            original.rows(),
            original.typ(),
            enhanced.cols(),
            enhanced.rows(),
            enhanced.typ()
        )));
    }

    let mut composite = Mat::default();
    hconcat2(original, enhanced, &mut composite)
        .map_err(|e| MediaError::internal(format!("hconcat failed: {e}")))?;
    Ok(composite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_8UC3};

    fn frame(rows: i32, cols: i32, value: f64) -> Mat {
        Mat::new_rows_cols_with_default(rows, cols, CV_8UC3, Scalar::all(value)).unwrap()
    }

    #[test]
    fn test_composite_geometry() {
        let original = frame(48, 64, 10.0);
        let enhanced = frame(48, 64, 200.0);
        let composite = compose_side_by_side(&original, &enhanced).unwrap();
        assert_eq!(composite.cols(), 128);
        assert_eq!(composite.rows(), 48);
        assert_eq!(composite.typ(), CV_8UC3);
    }

    #[test]
    fn test_mismatched_dimensions_rejected() {
        let original = frame(48, 64, 10.0);
        let enhanced = frame(48, 32, 200.0);
        assert!(compose_side_by_side(&original, &enhanced).is_err());
    }

    #[test]
    fn test_left_half_is_original() {
        let original = frame(4, 4, 10.0);
        let enhanced = frame(4, 4, 200.0);
        let composite = compose_side_by_side(&original, &enhanced).unwrap();
        let left = composite.at_2d::<opencv::core::Vec3b>(0, 0).unwrap();
        let right = composite.at_2d::<opencv::core::Vec3b>(0, 4).unwrap();
        assert_eq!(left[0], 10);
        assert_eq!(right[0], 200);
    }
}
