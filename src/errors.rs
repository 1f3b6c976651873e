//! Error taxonomy shared by all media stages.
//!
//! Each stage retries only errors it can locally classify as transient;
//! everything else propagates unchanged to the orchestrator.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the fetch/merge/extract/composite stages.
#[derive(Error, Debug)]
pub enum MediaError {
    /// Bad URL or unsupported format. Never retried, surfaced immediately.
    #[error("Invalid source: {message}")]
    InvalidSource { message: String },

    /// File lock or contention on an output path. Retried with backoff.
    #[error("Transient I/O failure: {message}")]
    TransientIo { message: String },

    /// Permission, age restriction, sign-in wall, or removed content.
    /// Permanent; carries a user-facing reason.
    #[error("Source unavailable: {reason}")]
    UnavailableSource { reason: String },

    /// Media that cannot be decoded. Not retried; callers fall back to
    /// the prior valid artifact instead of aborting the pipeline.
    #[error("Corrupt source {path}: {message}")]
    CorruptSource { path: PathBuf, message: String },

    /// Nonzero exit from ffmpeg, ffprobe, or a download client.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    ToolFailure {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// Plain I/O error with operation context.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl MediaError {
    /// Create an invalid source error.
    pub fn invalid_source(message: impl Into<String>) -> Self {
        Self::InvalidSource {
            message: message.into(),
        }
    }

    /// Create a transient I/O error.
    pub fn transient_io(message: impl Into<String>) -> Self {
        Self::TransientIo {
            message: message.into(),
        }
    }

    /// Create an unavailable source error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::UnavailableSource {
            reason: reason.into(),
        }
    }

    /// Create a corrupt source error.
    pub fn corrupt(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::CorruptSource {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an external tool failure.
    pub fn tool_failure(
        tool: impl Into<String>,
        exit_code: i32,
        message: impl Into<String>,
    ) -> Self {
        Self::ToolFailure {
            tool: tool.into(),
            exit_code,
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Whether a bounded retry with backoff is worthwhile.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientIo { .. })
    }

    /// Whether retrying can never help (bad input or gated content).
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::InvalidSource { .. } | Self::UnavailableSource { .. } | Self::CorruptSource { .. }
        )
    }
}

/// Result type for media stage operations.
pub type MediaResult<T> = Result<T, MediaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(MediaError::transient_io("output held by another process").is_transient());
        assert!(!MediaError::tool_failure("ffmpeg", 1, "boom").is_transient());
    }

    #[test]
    fn permanent_classification() {
        assert!(MediaError::invalid_source("not a video URL").is_permanent());
        assert!(MediaError::unavailable("age-restricted video").is_permanent());
        assert!(MediaError::corrupt("/tmp/a.mp4", "no decodable frame").is_permanent());
        assert!(!MediaError::tool_failure("ffprobe", 1, "bad exit").is_permanent());
    }

    #[test]
    fn tool_failure_displays_context() {
        let err = MediaError::tool_failure("ffmpeg", 187, "Invalid data found");
        let msg = err.to_string();
        assert!(msg.contains("ffmpeg"));
        assert!(msg.contains("exit code 187"));
        assert!(msg.contains("Invalid data found"));
    }
}
