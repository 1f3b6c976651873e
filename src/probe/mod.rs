//! Container probing via ffprobe.
//!
//! Reports duration and stream properties without decoding content, and
//! offers a one-frame decode check used as the extraction precondition.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

use crate::errors::{MediaError, MediaResult};

/// Video stream properties reported by ffprobe.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoProperties {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second.
    pub fps: f64,
    /// Container duration in seconds.
    pub duration: f64,
}

impl VideoProperties {
    /// Seconds per frame.
    pub fn frame_interval(&self) -> f64 {
        if self.fps > 0.0 {
            1.0 / self.fps
        } else {
            0.0
        }
    }
}

/// Get the duration of a media file in seconds.
///
/// Nonzero exit or unparsable output is treated as corruption.
pub fn probe_duration(path: &Path) -> MediaResult<f64> {
    ensure_exists(path)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .map_err(|e| MediaError::io("run ffprobe", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MediaError::tool_failure(
            "ffprobe",
            output.status.code().unwrap_or(-1),
            stderr.trim().to_string(),
        ));
    }

    let text = String::from_utf8_lossy(&output.stdout);
    text.trim()
        .parse::<f64>()
        .map_err(|_| MediaError::corrupt(path, format!("unparsable duration: {:?}", text.trim())))
}

/// Get width, height, fps, and duration of the first video stream.
pub fn probe_video_properties(path: &Path) -> MediaResult<VideoProperties> {
    ensure_exists(path)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_streams",
            "-show_format",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .map_err(|e| MediaError::io("run ffprobe", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MediaError::tool_failure(
            "ffprobe",
            output.status.code().unwrap_or(-1),
            stderr.trim().to_string(),
        ));
    }

    let json: Value = serde_json::from_slice(&output.stdout)
        .map_err(|e| MediaError::corrupt(path, format!("unparsable ffprobe JSON: {}", e)))?;

    parse_properties(&json).ok_or_else(|| MediaError::corrupt(path, "no video stream reported"))
}

/// Verify the file opens and yields at least one decodable frame.
pub fn decode_check(path: &Path) -> MediaResult<()> {
    ensure_exists(path)?;

    let output = Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args(["-frames:v", "1", "-f", "null", "-"])
        .output()
        .map_err(|e| MediaError::io("run ffmpeg", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MediaError::corrupt(
            path,
            format!(
                "no decodable frame: {}",
                stderr.lines().last().unwrap_or("unknown decode error")
            ),
        ));
    }

    Ok(())
}

/// Fail with `InvalidSource` when the path does not exist.
pub fn ensure_exists(path: &Path) -> MediaResult<()> {
    if !path.exists() {
        return Err(MediaError::invalid_source(format!(
            "file not found: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Parse the ffprobe JSON into properties.
fn parse_properties(json: &Value) -> Option<VideoProperties> {
    let stream = json.get("streams")?.as_array()?.first()?;

    let width = stream.get("width")?.as_u64()? as u32;
    let height = stream.get("height")?.as_u64()? as u32;

    let fps = stream
        .get("avg_frame_rate")
        .and_then(|r| r.as_str())
        .and_then(parse_rational)
        .filter(|fps| *fps > 0.0)
        .or_else(|| {
            stream
                .get("r_frame_rate")
                .and_then(|r| r.as_str())
                .and_then(parse_rational)
        })
        .unwrap_or(0.0);

    // Stream-level duration is missing in some containers; fall back to format.
    let duration = stream
        .get("duration")
        .and_then(|d| d.as_str())
        .and_then(|d| d.parse().ok())
        .or_else(|| {
            json.get("format")
                .and_then(|f| f.get("duration"))
                .and_then(|d| d.as_str())
                .and_then(|d| d.parse().ok())
        })
        .unwrap_or(0.0);

    Some(VideoProperties {
        width,
        height,
        fps,
        duration,
    })
}

/// Parse an ffprobe rational like "30000/1001".
fn parse_rational(s: &str) -> Option<f64> {
    match s.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            if den == 0.0 {
                None
            } else {
                Some(num / den)
            }
        }
        None => s.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_invalid_source() {
        let result = probe_duration(Path::new("/nonexistent/video.mp4"));
        assert!(matches!(result, Err(MediaError::InvalidSource { .. })));
    }

    #[test]
    fn parse_rational_forms() {
        assert_eq!(parse_rational("30000/1001").map(|f| (f * 1000.0).round()), Some(29970.0));
        assert_eq!(parse_rational("25"), Some(25.0));
        assert_eq!(parse_rational("0/0"), None);
        assert_eq!(parse_rational("garbage"), None);
    }

    #[test]
    fn parse_properties_from_ffprobe_json() {
        let json: Value = serde_json::from_str(
            r#"{
                "streams": [{
                    "width": 1920,
                    "height": 1080,
                    "avg_frame_rate": "25/1",
                    "duration": "300.000000"
                }],
                "format": { "duration": "300.000000" }
            }"#,
        )
        .unwrap();

        let props = parse_properties(&json).unwrap();
        assert_eq!(props.width, 1920);
        assert_eq!(props.height, 1080);
        assert!((props.fps - 25.0).abs() < 1e-9);
        assert!((props.duration - 300.0).abs() < 1e-9);
        assert!((props.frame_interval() - 0.04).abs() < 1e-9);
    }

    #[test]
    fn parse_properties_falls_back_to_format_duration() {
        let json: Value = serde_json::from_str(
            r#"{
                "streams": [{ "width": 640, "height": 360, "avg_frame_rate": "0/0", "r_frame_rate": "24/1" }],
                "format": { "duration": "12.5" }
            }"#,
        )
        .unwrap();

        let props = parse_properties(&json).unwrap();
        assert!((props.fps - 24.0).abs() < 1e-9);
        assert!((props.duration - 12.5).abs() < 1e-9);
    }

    #[test]
    fn parse_properties_rejects_missing_stream() {
        let json: Value = serde_json::from_str(r#"{ "streams": [], "format": {} }"#).unwrap();
        assert!(parse_properties(&json).is_none());
    }
}
