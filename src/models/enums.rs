//! Shared enumerations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Teaser tone, drives simulated analysis and caption wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Exciting,
    Educational,
    Inspirational,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tone::Professional => "professional",
            Tone::Exciting => "exciting",
            Tone::Educational => "educational",
            Tone::Inspirational => "inspirational",
        };
        write!(f, "{}", name)
    }
}

/// Segment extraction strategy.
///
/// Stream copy is fast and lossless but only accurate to the nearest
/// keyframe. Frame-accurate re-encodes and is exact; required when
/// overlay timing matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractMode {
    #[default]
    StreamCopy,
    FrameAccurate,
}

impl fmt::Display for ExtractMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractMode::StreamCopy => write!(f, "stream_copy"),
            ExtractMode::FrameAccurate => write!(f, "frame_accurate"),
        }
    }
}

/// Output container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    #[default]
    Mp4,
    Mkv,
    Webm,
}

impl ContainerFormat {
    /// File extension for this container.
    pub fn extension(&self) -> &'static str {
        match self {
            ContainerFormat::Mp4 => "mp4",
            ContainerFormat::Mkv => "mkv",
            ContainerFormat::Webm => "webm",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_serializes_lowercase() {
        let json = serde_json::to_string(&Tone::Exciting).unwrap();
        assert_eq!(json, "\"exciting\"");
    }

    #[test]
    fn extract_mode_default_is_stream_copy() {
        assert_eq!(ExtractMode::default(), ExtractMode::StreamCopy);
    }

    #[test]
    fn container_extension() {
        assert_eq!(ContainerFormat::Mp4.extension(), "mp4");
    }
}
