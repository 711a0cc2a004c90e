//! Frame sampler: decode with temporal subsampling.
//!
//! Yields every (skip+1)-th decoded frame at the source resolution. The
//! sequence is lazy, finite and non-restartable; a mid-run decode error is
//! reported once and terminates the stream.

use std::path::Path;

use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio::{
    VideoCapture, CAP_ANY, CAP_PROP_FPS, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH,
};
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// One sampled frame with its index in the source stream.
#[derive(Debug)]
pub struct SampledFrame {
    /// Decode index of this frame; increases by (skip+1) between yields.
    pub index: u64,
    /// The decoded frame at source resolution, BGR, 8 bits per channel.
    pub frame: Mat,
}

/// Iterator over sampled frames of a video source.
pub struct FrameSampler {
    cap: VideoCapture,
    frame_skip: u32,
    frames_seen: u64,
    fps: f64,
    width: i32,
    height: i32,
    done: bool,
}

impl FrameSampler {
    /// Open a video source for sampling.
    ///
    /// Returns [`MediaError::SourceUnavailable`] when the source cannot be
    /// opened.
    pub fn open(path: &Path, frame_skip: u32) -> MediaResult<Self> {
        let path_str = path.to_string_lossy();
        let cap = VideoCapture::from_file(&path_str, CAP_ANY)
            .map_err(|_| MediaError::SourceUnavailable(path.to_path_buf()))?;

        if !cap.is_opened().unwrap_or(false) {
            return Err(MediaError::SourceUnavailable(path.to_path_buf()));
        }

        let fps = cap.get(CAP_PROP_FPS).unwrap_or(0.0);
        let width = cap.get(CAP_PROP_FRAME_WIDTH).unwrap_or(0.0) as i32;
        let height = cap.get(CAP_PROP_FRAME_HEIGHT).unwrap_or(0.0) as i32;

        debug!(
            path = %path.display(),
            fps,
            width,
            height,
            frame_skip,
            "Opened video source"
        );

        Ok(Self {
            cap,
            frame_skip,
            frames_seen: 0,
            fps,
            width,
            height,
            done: false,
        })
    }

    /// Source frame rate.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Source frame width in pixels.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Source frame height in pixels.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Total frames decoded so far, sampled or not.
    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }
}

impl Iterator for FrameSampler {
    type Item = MediaResult<SampledFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let mut frame = Mat::default();
            let grabbed = match self.cap.read(&mut frame) {
                Ok(grabbed) => grabbed,
                Err(e) => {
                    self.done = true;
                    return Some(Err(MediaError::decode_failed(format!(
                        "read error at frame {}: {e}",
                        self.frames_seen
                    ))));
                }
            };

            if !grabbed || frame.empty() {
                self.done = true;
                return None;
            }

            let index = self.frames_seen;
            self.frames_seen += 1;

            if index % (u64::from(self.frame_skip) + 1) == 0 {
                return Some(Ok(SampledFrame { index, frame }));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_models::RunSummary;
    use opencv::core::{Scalar, Size, CV_8UC3};
    use opencv::videoio::VideoWriter;

    #[test]
    fn test_open_missing_source() {
        let err = FrameSampler::open(Path::new("/nonexistent/video.mp4"), 4).unwrap_err();
        assert!(matches!(err, MediaError::SourceUnavailable(_)));
    }

    fn write_clip(path: &Path, frames: i32) {
        let fourcc = VideoWriter::fourcc('X', 'V', 'I', 'D').unwrap();
        let mut writer =
            VideoWriter::new(&path.to_string_lossy(), fourcc, 25.0, Size::new(64, 48), true)
                .unwrap();
        assert!(writer.is_opened().unwrap());
        for i in 0..frames {
            let frame =
                Mat::new_rows_cols_with_default(48, 64, CV_8UC3, Scalar::all(f64::from(i % 256)))
                    .unwrap();
            writer.write(&frame).unwrap();
        }
        writer.release().unwrap();
    }

    fn sampled_indices(path: &Path, frame_skip: u32) -> (Vec<u64>, u64) {
        let mut sampler = FrameSampler::open(path, frame_skip).unwrap();
        let mut indices = Vec::new();
        for item in &mut sampler {
            indices.push(item.unwrap().index);
        }
        (indices, sampler.frames_seen())
    }

    #[test]
    fn test_indices_step_by_skip_plus_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.avi");
        write_clip(&path, 11);

        let (indices, frames_seen) = sampled_indices(&path, 4);
        assert_eq!(indices, vec![0, 5, 10]);
        assert_eq!(frames_seen, 11);
        assert_eq!(
            indices.len() as u64,
            RunSummary::expected_processed(frames_seen, 4)
        );
    }

    #[test]
    fn test_skip_zero_yields_every_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.avi");
        write_clip(&path, 6);

        let (indices, frames_seen) = sampled_indices(&path, 0);
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(frames_seen, 6);
        assert_eq!(
            indices.len() as u64,
            RunSummary::expected_processed(frames_seen, 0)
        );
    }
}
