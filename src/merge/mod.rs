//! Stream merging: re-encode and mux separate video/audio files.
//!
//! Used when the primary download strategy yields video-only and
//! audio-only streams. The video track is re-encoded to H.264 and the
//! audio to AAC, mapping exactly one stream of each into a single mp4.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::errors::{MediaError, MediaResult};
use crate::probe;

/// Merge a video-only and an audio-only file into one playable mp4.
///
/// On transcoder failure the partial output and both input streams are
/// removed and a retryable error is returned; the caller owns the retry
/// bound. On success the unmerged inputs are deleted.
pub fn merge_streams(video: &Path, audio: &Path, out_dir: &Path) -> MediaResult<PathBuf> {
    let stem = video
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("streams");
    let output = out_dir.join(format!("merged_{}.mp4", stem));

    let args = merge_args(video, audio, &output);
    tracing::debug!("Running ffmpeg: {}", args.join(" "));

    let result = Command::new("ffmpeg")
        .args(&args)
        .output()
        .map_err(|e| MediaError::io("run ffmpeg", e))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        cleanup_files(&[&output, video, audio]);
        return Err(MediaError::tool_failure(
            "ffmpeg",
            result.status.code().unwrap_or(-1),
            stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("merge failed")
                .to_string(),
        ));
    }

    // A merge that ffmpeg exits cleanly from can still produce a
    // container with no readable duration; treat that as corruption.
    match probe::probe_duration(&output) {
        Ok(duration) => {
            tracing::debug!(
                "Merged {} + {} -> {} ({:.2}s)",
                video.display(),
                audio.display(),
                output.display(),
                duration
            );
        }
        Err(e) => {
            cleanup_files(&[&output, video, audio]);
            return Err(MediaError::tool_failure(
                "ffprobe",
                -1,
                format!("merged file failed verification: {}", e),
            ));
        }
    }

    cleanup_files(&[video, audio]);
    Ok(output)
}

/// Build the ffmpeg argument list for a merge.
fn merge_args(video: &Path, audio: &Path, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        video.display().to_string(),
        "-i".to_string(),
        audio.display().to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-map".to_string(),
        "0:v:0".to_string(),
        "-map".to_string(),
        "1:a:0".to_string(),
        "-preset".to_string(),
        "veryfast".to_string(),
        output.display().to_string(),
    ]
}

fn cleanup_files(paths: &[&Path]) {
    for path in paths {
        if path.exists() {
            if let Err(e) = fs::remove_file(path) {
                tracing::warn!("Failed to remove intermediate {}: {}", path.display(), e);
            }
        }
    }
}
