//! FFprobe video information.
//!
//! The orchestrator observes the input independently of the pipeline; this
//! probe is that observation path.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use lumen_models::VideoMetadata;

use crate::error::{MediaError, MediaResult};

/// Video file information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame rate (fps)
    pub fps: f64,
    /// Total frame count
    pub frame_count: u64,
    /// Video codec
    pub codec: String,
}

impl VideoInfo {
    /// Fold into the orchestrator-level metadata record.
    pub fn to_metadata(&self) -> VideoMetadata {
        VideoMetadata::new(
            self.duration,
            self.width,
            self.height,
            self.fps,
            self.frame_count,
        )
    }
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
}

/// Probe a video file for information.
pub async fn probe_video(path: impl AsRef<Path>) -> MediaResult<VideoInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: "FFprobe failed".to_string(),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)?;

    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| MediaError::InvalidVideo("No video stream found".to_string()))?;

    let duration = probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let fps = select_fps(
        video_stream.avg_frame_rate.as_deref(),
        video_stream.r_frame_rate.as_deref(),
    );

    // nb_frames is container-dependent; fall back to duration * fps.
    let frame_count = video_stream
        .nb_frames
        .as_ref()
        .and_then(|n| n.parse::<u64>().ok())
        .unwrap_or_else(|| (duration * fps).round() as u64);

    Ok(VideoInfo {
        duration,
        width: video_stream.width.unwrap_or(0),
        height: video_stream.height.unwrap_or(0),
        fps,
        frame_count,
        codec: video_stream.codec_name.clone().unwrap_or_default(),
    })
}

/// Pick the frame rate, falling back to `r_frame_rate` when `avg_frame_rate`
/// is absent or degenerate (some containers report "0/0").
fn select_fps(avg: Option<&str>, real: Option<&str>) -> f64 {
    avg.and_then(parse_frame_rate)
        .or_else(|| real.and_then(parse_frame_rate))
        .unwrap_or(0.0)
}

/// Parse frame rate string (e.g., "30/1" or "29.97").
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert!((parse_frame_rate("30/1").unwrap() - 30.0).abs() < 0.01);
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("29.97").unwrap() - 29.97).abs() < 0.01);
        assert!(parse_frame_rate("30/0").is_none());
    }

    #[test]
    fn test_select_fps_falls_back_past_degenerate_avg() {
        assert!((select_fps(Some("0/0"), Some("30/1")) - 30.0).abs() < 0.01);
        assert!((select_fps(Some("25/1"), Some("30/1")) - 25.0).abs() < 0.01);
        assert!((select_fps(None, Some("24/1")) - 24.0).abs() < 0.01);
        assert_eq!(select_fps(Some("0/0"), None), 0.0);
    }

    #[test]
    fn test_metadata_conversion() {
        let info = VideoInfo {
            duration: 10.0,
            width: 1280,
            height: 720,
            fps: 25.0,
            frame_count: 250,
            codec: "h264".to_string(),
        };
        let meta = info.to_metadata();
        assert_eq!(meta.resolution, "1280x720");
        assert_eq!(meta.total_frames, 250);
        assert_eq!(meta.processed_frames, 0);
    }

    #[tokio::test]
    async fn test_probe_missing_file() {
        let err = probe_video("/nonexistent/video.mp4").await.unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}
