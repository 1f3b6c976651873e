//! Download client interface and error classification.

use std::path::{Path, PathBuf};

use crate::errors::{MediaError, MediaResult};

/// What a single download attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    /// A single playable file with both video and audio.
    Combined(PathBuf),
    /// Separate video-only and audio-only files that still need merging.
    Split { video: PathBuf, audio: PathBuf },
}

/// One download strategy.
///
/// Implementations perform a single attempt; retry and fallback policy
/// lives in the [`Fetcher`](super::Fetcher).
pub trait DownloadClient: Send + Sync {
    /// Client name for logging and error context.
    fn name(&self) -> &str;

    /// Download the URL into `dest_dir`, performing one attempt.
    fn download(&self, url: &str, dest_dir: &Path) -> MediaResult<Fetched>;
}

/// Classify a download tool's stderr into the error taxonomy.
///
/// Transient file locks retry with backoff; age restriction,
/// unavailability, and sign-in walls are permanent.
pub fn classify_download_error(tool: &str, exit_code: i32, stderr: &str) -> MediaError {
    let lower = stderr.to_lowercase();

    if lower.contains("winerror 32")
        || lower.contains("permission denied")
        || lower.contains("being used by another process")
        || lower.contains("resource temporarily unavailable")
    {
        return MediaError::transient_io(last_line(stderr));
    }

    if lower.contains("age restricted") || lower.contains("age-restricted") {
        return MediaError::unavailable("Age-restricted video. Cannot download.");
    }
    if lower.contains("private video") || lower.contains("unavailable") {
        return MediaError::unavailable("Video is unavailable or private.");
    }
    if lower.contains("sign in") {
        return MediaError::unavailable("Video requires sign-in to access.");
    }

    MediaError::tool_failure(tool, exit_code, last_line(stderr))
}

fn last_line(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("no error output")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_errors_are_transient() {
        let err = classify_download_error(
            "yt-dlp",
            1,
            "ERROR: unable to rename file: [WinError 32] The process cannot access the file",
        );
        assert!(err.is_transient());

        let err = classify_download_error("yt-dlp", 1, "ERROR: Permission denied: 'video.mp4'");
        assert!(err.is_transient());
    }

    #[test]
    fn gated_content_is_permanent() {
        for stderr in [
            "ERROR: This video is age restricted",
            "ERROR: Video unavailable",
            "ERROR: Sign in to confirm your age",
            "ERROR: Private video",
        ] {
            let err = classify_download_error("yt-dlp", 1, stderr);
            assert!(
                matches!(err, MediaError::UnavailableSource { .. }),
                "expected permanent for {:?}, got {:?}",
                stderr,
                err
            );
        }
    }

    #[test]
    fn unknown_failure_is_tool_failure() {
        let err = classify_download_error("yt-dlp", 2, "ERROR: something odd\n");
        match err {
            MediaError::ToolFailure {
                tool, exit_code, ..
            } => {
                assert_eq!(tool, "yt-dlp");
                assert_eq!(exit_code, 2);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn last_line_skips_blanks() {
        assert_eq!(last_line("first\nlast\n\n"), "last");
        assert_eq!(last_line(""), "no error output");
    }
}
