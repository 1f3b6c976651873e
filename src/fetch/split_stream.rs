//! Primary download strategy: separate best video and audio streams.
//!
//! Mirrors the highest-quality path: yt-dlp fetches `bestvideo` and
//! `bestaudio` individually, and the stream merger re-muxes them into a
//! single playable container.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::errors::{MediaError, MediaResult};

use super::client::{classify_download_error, DownloadClient, Fetched};

/// yt-dlp client downloading video and audio as separate streams.
#[derive(Debug, Default)]
pub struct SplitStreamClient;

impl SplitStreamClient {
    pub fn new() -> Self {
        Self
    }

    /// Build the yt-dlp argument list for one stream download.
    fn stream_args(format: &str, template: &Path, url: &str) -> Vec<String> {
        vec![
            "--quiet".to_string(),
            "--no-warnings".to_string(),
            "--no-simulate".to_string(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
            "-f".to_string(),
            format.to_string(),
            "-o".to_string(),
            template.display().to_string(),
            url.to_string(),
        ]
    }

    /// Download one stream and return the file yt-dlp reports.
    fn download_stream(&self, format: &str, template: &Path, url: &str) -> MediaResult<PathBuf> {
        let args = Self::stream_args(format, template, url);
        tracing::debug!("Running yt-dlp: {}", args.join(" "));

        let output = Command::new("yt-dlp")
            .args(&args)
            .output()
            .map_err(|e| MediaError::io("run yt-dlp", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_download_error(
                "yt-dlp",
                output.status.code().unwrap_or(-1),
                &stderr,
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = stdout
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .map(|line| PathBuf::from(line.trim()))
            .ok_or_else(|| {
                MediaError::tool_failure("yt-dlp", 0, "did not report an output filepath")
            })?;

        if !path.exists() {
            return Err(MediaError::tool_failure(
                "yt-dlp",
                0,
                format!("reported file does not exist: {}", path.display()),
            ));
        }

        Ok(path)
    }
}

impl DownloadClient for SplitStreamClient {
    fn name(&self) -> &str {
        "yt-dlp (split streams)"
    }

    fn download(&self, url: &str, dest_dir: &Path) -> MediaResult<Fetched> {
        let video = self.download_stream(
            "bestvideo",
            &dest_dir.join("video_stream_%(id)s.%(ext)s"),
            url,
        )?;
        let audio = self.download_stream(
            "bestaudio",
            &dest_dir.join("audio_stream_%(id)s.%(ext)s"),
            url,
        )?;

        Ok(Fetched::Split { video, audio })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_args_shape() {
        let args = SplitStreamClient::stream_args(
            "bestvideo",
            Path::new("/tmp/run/video_stream_%(id)s.%(ext)s"),
            "https://youtu.be/dQw4w9WgXcQ",
        );
        assert_eq!(args[0], "--quiet");
        assert!(args.contains(&"bestvideo".to_string()));
        assert!(args.contains(&"--no-simulate".to_string()));
        assert!(args
            .iter()
            .any(|a| a.contains("video_stream_%(id)s.%(ext)s")));
        assert_eq!(args.last().unwrap(), "https://youtu.be/dQw4w9WgXcQ");
    }
}
