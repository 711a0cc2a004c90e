//! Video metadata observed by the run orchestrator.

use serde::{Deserialize, Serialize};

/// Metadata about the input video, queried independently of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Resolution as "WIDTHxHEIGHT", or "Unknown" when the probe failed.
    pub resolution: String,
    /// Source frame rate.
    pub fps: f64,
    /// Total frames in the source.
    pub total_frames: u64,
    /// Frames the pipeline actually processed (0 on failure).
    pub processed_frames: u64,
}

impl VideoMetadata {
    /// Build metadata from probed dimensions.
    pub fn new(duration_secs: f64, width: u32, height: u32, fps: f64, total_frames: u64) -> Self {
        Self {
            duration_secs,
            resolution: format!("{width}x{height}"),
            fps,
            total_frames,
            processed_frames: 0,
        }
    }

    /// Fallback metadata for a source that could not be probed.
    pub fn unknown() -> Self {
        Self {
            duration_secs: 0.0,
            resolution: "Unknown".to_string(),
            fps: 0.0,
            total_frames: 0,
            processed_frames: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_formatting() {
        let meta = VideoMetadata::new(12.5, 1920, 1080, 29.97, 374);
        assert_eq!(meta.resolution, "1920x1080");
        assert_eq!(meta.processed_frames, 0);
    }

    #[test]
    fn test_unknown_metadata() {
        let meta = VideoMetadata::unknown();
        assert_eq!(meta.resolution, "Unknown");
        assert_eq!(meta.total_frames, 0);
        assert_eq!(meta.fps, 0.0);
    }
}
