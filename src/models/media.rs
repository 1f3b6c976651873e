//! Media-related data structures (sources, highlights, overlays, artifacts).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::enums::ContainerFormat;

/// Video file extensions the pipeline accepts for local sources.
pub const SUPPORTED_VIDEO_EXTENSIONS: &[&str] =
    &["mp4", "mov", "avi", "mkv", "wmv", "flv", "webm", "m4v"];

/// Where a video comes from: a local file or a remote URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaSource {
    /// A file already on disk.
    Local(PathBuf),
    /// A remote URL to be fetched.
    Remote(String),
}

impl MediaSource {
    /// Local path if this source is already on disk.
    pub fn local_path(&self) -> Option<&Path> {
        match self {
            MediaSource::Local(path) => Some(path),
            MediaSource::Remote(_) => None,
        }
    }

    /// Whether fetching is required before extraction can start.
    pub fn is_remote(&self) -> bool {
        matches!(self, MediaSource::Remote(_))
    }
}

/// Check a filename against the supported video extensions.
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let lower = ext.to_ascii_lowercase();
            SUPPORTED_VIDEO_EXTENSIONS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}

/// A time range the analysis step picked out of the source.
///
/// Invariant: `0 <= start < end <= source duration`, `score` in [0, 1].
/// Produced once by analysis, consumed immutably by extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    /// Start offset in seconds.
    pub start: f64,
    /// End offset in seconds (exclusive).
    pub end: f64,
    /// Confidence score in [0, 1].
    pub score: f64,
    /// Human-readable description.
    pub description: String,
}

impl Highlight {
    /// Create a new highlight.
    pub fn new(start: f64, end: f64, score: f64, description: impl Into<String>) -> Self {
        Self {
            start,
            end,
            score,
            description: description.into(),
        }
    }

    /// Length of the highlight in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Check the range invariant against a known source duration.
    pub fn is_valid_for(&self, source_duration: f64) -> bool {
        self.start >= 0.0
            && self.start < self.end
            && self.end <= source_duration
            && (0.0..=1.0).contains(&self.score)
    }
}

/// A timed caption to burn into frames.
///
/// Entries may overlap in time; per frame, only the first matching
/// entry in list order is rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayEntry {
    /// When the caption appears, in seconds.
    pub start: f64,
    /// When the caption disappears, in seconds.
    pub end: f64,
    /// Caption text.
    pub text: String,
}

impl OverlayEntry {
    /// Create a new overlay entry.
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Whether a frame timestamp falls inside this entry's window.
    pub fn contains(&self, timestamp: f64) -> bool {
        timestamp >= self.start && timestamp < self.end
    }
}

/// The produced file plus its container format.
///
/// Created by the compositor, owned by the caller; deleted on cleanup
/// or overwritten on the next run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputArtifact {
    /// Path to the final file.
    pub path: PathBuf,
    /// Container format of the file.
    pub container: ContainerFormat,
}

impl OutputArtifact {
    /// Create a new artifact record.
    pub fn new(path: impl Into<PathBuf>, container: ContainerFormat) -> Self {
        Self {
            path: path.into(),
            container,
        }
    }
}
