//! Fallback download strategy: single progressive file.
//!
//! Tries a sequence of declarative format filters, most compatible
//! first, and lets the client mux adaptive picks internally. Used when
//! the split-stream path keeps failing.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::errors::{MediaError, MediaResult};

use super::client::{classify_download_error, DownloadClient, Fetched};

/// Format filters tried in order: progressive mp4, adaptive mp4, any mp4.
const FORMAT_FILTERS: &[&str] = &[
    "best[ext=mp4][vcodec!=none][acodec!=none]",
    "bestvideo[ext=mp4]+bestaudio",
    "best[ext=mp4]",
];

/// yt-dlp client downloading one combined file.
#[derive(Debug, Default)]
pub struct ProgressiveClient;

impl ProgressiveClient {
    pub fn new() -> Self {
        Self
    }

    /// Build the yt-dlp argument list for one format filter.
    fn filter_args(format: &str, template: &Path, url: &str) -> Vec<String> {
        vec![
            "--quiet".to_string(),
            "--no-warnings".to_string(),
            "--no-simulate".to_string(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
            "--merge-output-format".to_string(),
            "mp4".to_string(),
            "-f".to_string(),
            format.to_string(),
            "-o".to_string(),
            template.display().to_string(),
            url.to_string(),
        ]
    }

    fn try_filter(&self, format: &str, template: &Path, url: &str) -> MediaResult<PathBuf> {
        let args = Self::filter_args(format, template, url);
        tracing::debug!("Running yt-dlp (fallback): {}", args.join(" "));

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
        stdout
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .map(|line| PathBuf::from(line.trim()))
            .filter(|path| path.exists())
            .ok_or_else(|| {
                MediaError::tool_failure("yt-dlp", 0, "did not produce an output file")
            })
    }

    /// Whether the failure means "this filter has no matching stream",
    /// in which case the next filter is worth trying.
    fn filter_unmatched(err: &MediaError) -> bool {
        match err {
            MediaError::ToolFailure { message, .. } => {
                let lower = message.to_lowercase();
                lower.contains("requested format is not available")
                    || lower.contains("no video formats found")
            }
            _ => false,
        }
    }
}

impl DownloadClient for ProgressiveClient {
    fn name(&self) -> &str {
        "yt-dlp (progressive)"
    }

    fn download(&self, url: &str, dest_dir: &Path) -> MediaResult<Fetched> {
        let template = dest_dir.join("fallback_%(id)s.%(ext)s");
        let mut last_err = None;

        for format in FORMAT_FILTERS {
            match self.try_filter(format, &template, url) {
                Ok(path) => return Ok(Fetched::Combined(path)),
                Err(e) if Self::filter_unmatched(&e) => {
                    tracing::debug!("Format filter {:?} unmatched, trying next", format);
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err
            .unwrap_or_else(|| MediaError::tool_failure("yt-dlp", 0, "no downloadable stream found")))
    }
}
