//! Time-bounded segment extraction.
//!
//! Cuts `[start, end)` out of a source file with ffmpeg. Stream copy is
//! the fast path (keyframe-aligned, no re-encode); frame-accurate mode
//! re-encodes so the cut lands exactly on the requested timestamps.
//! Several cuts from the same source can be joined back to back with
//! the concat demuxer.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::ExtractSettings;
use crate::errors::{MediaError, MediaResult};
use crate::models::ExtractMode;
use crate::probe;

/// Extract one segment from `source` into `out_dir`.
///
/// The source must decode cleanly; a failed decode check fails the
/// whole extraction with `CorruptSource` before any cutting starts.
/// `end` past the probed duration is clamped, a zero-or-negative window
/// is rejected.
pub fn extract_segment(
    source: &Path,
    start: f64,
    end: f64,
    settings: &ExtractSettings,
    out_dir: &Path,
) -> MediaResult<PathBuf> {
    probe::ensure_exists(source)?;
    probe::decode_check(source)?;

    if start < 0.0 || !start.is_finite() || !end.is_finite() {
        return Err(MediaError::invalid_source(format!(
            "segment bounds must be finite and non-negative: {}..{}",
            start, end
        )));
    }

    let duration = probe::probe_duration(source)?;
    let end = if end > duration {
        tracing::warn!(
            "Segment end {:.2}s past source duration {:.2}s, clamping",
            end,
            duration
        );
        duration
    } else {
        end
    };

    if start >= end {
        return Err(MediaError::invalid_source(format!(
            "empty segment window: {:.2}s..{:.2}s",
            start, end
        )));
    }

    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("segment");
    let output = out_dir.join(format!("{}_cut_{:.0}_{:.0}.mp4", stem, start, end));

    let args = match settings.mode {
        ExtractMode::StreamCopy => copy_args(source, start, end, &output),
        ExtractMode::FrameAccurate => reencode_args(source, start, end, &settings.preset, &output),
    };
    tracing::debug!("Running ffmpeg: {}", args.join(" "));

    let result = Command::new("ffmpeg")
        .args(&args)
        .output()
        .map_err(|e| MediaError::io("run ffmpeg", e))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        if output.exists() {
            if let Err(e) = std::fs::remove_file(&output) {
                tracing::warn!("Failed to remove partial {}: {}", output.display(), e);
            }
        }
        return Err(MediaError::tool_failure(
            "ffmpeg",
            result.status.code().unwrap_or(-1),
            stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("extraction failed")
                .to_string(),
        ));
    }

    Ok(output)
}

/// Join segments back to back into one file.
///
/// All segments must come from the same extraction run (identical
/// codecs), so the concat demuxer can stream-copy. A single segment
/// passes through untouched.
pub fn concat_segments(segments: &[PathBuf], out_dir: &Path) -> MediaResult<PathBuf> {
    let first = segments
        .first()
        .ok_or_else(|| MediaError::invalid_source("no segments to concatenate"))?;
    if segments.len() == 1 {
        return Ok(first.clone());
    }
    for segment in segments {
        probe::ensure_exists(segment)?;
    }

    let list_path = out_dir.join("concat_list.txt");
    std::fs::write(&list_path, concat_list(segments))
        .map_err(|e| MediaError::io("write concat list", e))?;

    let output = out_dir.join("joined.mp4");
    let args = concat_args(&list_path, &output);
    tracing::debug!("Running ffmpeg: {}", args.join(" "));

    let result = Command::new("ffmpeg")
        .args(&args)
        .output()
        .map_err(|e| MediaError::io("run ffmpeg", e))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        if output.exists() {
            if let Err(e) = std::fs::remove_file(&output) {
                tracing::warn!("Failed to remove partial {}: {}", output.display(), e);
            }
        }
        return Err(MediaError::tool_failure(
            "ffmpeg",
            result.status.code().unwrap_or(-1),
            stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("concatenation failed")
                .to_string(),
        ));
    }

    Ok(output)
}

/// Fast seek plus stream copy. The seek before `-i` snaps to the
/// nearest preceding keyframe.
fn copy_args(source: &Path, start: f64, end: f64, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-ss".to_string(),
        format_ts(start),
        "-i".to_string(),
        source.display().to_string(),
        "-t".to_string(),
        format_ts(end - start),
        "-c".to_string(),
        "copy".to_string(),
        output.display().to_string(),
    ]
}

/// Re-encode for an exact cut on non-keyframe boundaries.
fn reencode_args(source: &Path, start: f64, end: f64, preset: &str, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-ss".to_string(),
        format_ts(start),
        "-i".to_string(),
        source.display().to_string(),
        "-t".to_string(),
        format_ts(end - start),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-preset".to_string(),
        preset.to_string(),
        output.display().to_string(),
    ]
}

/// Concat demuxer input list. Paths sit inside single quotes; embedded
/// quotes use the shell-style `'\''` escape the demuxer expects.
fn concat_list(segments: &[PathBuf]) -> String {
    segments
        .iter()
        .map(|p| {
            format!(
                "file '{}'\n",
                p.display().to_string().replace('\'', "'\\''")
            )
        })
        .collect()
}

fn concat_args(list: &Path, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-f".to_string(),
        "concat".to_string(),
        "-safe".to_string(),
        "0".to_string(),
        "-i".to_string(),
        list.display().to_string(),
        "-c".to_string(),
        "copy".to_string(),
        output.display().to_string(),
    ]
}

fn format_ts(seconds: f64) -> String {
    format!("{:.3}", seconds)
}
