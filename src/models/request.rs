//! Job request describing one teaser run.

use serde::{Deserialize, Serialize};

use super::enums::Tone;
use super::media::{MediaSource, OverlayEntry};

/// Everything the pipeline needs to produce one teaser.
///
/// Logo bytes are the raw uploaded image; the compositor writes them to
/// a scoped temp file for the duration of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeaserRequest {
    /// Where the source video comes from.
    pub source: MediaSource,
    /// Desired teaser length in seconds.
    pub target_duration: f64,
    /// Caption and highlight tone.
    pub tone: Tone,
    /// Timed captions to burn in, relative to the extracted segment.
    #[serde(default)]
    pub overlays: Vec<OverlayEntry>,
    /// Raw logo image bytes, if branding was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<Vec<u8>>,
    /// Tagline text, if branding was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
}

impl TeaserRequest {
    /// Create a request with no overlays or branding.
    pub fn new(source: MediaSource, target_duration: f64, tone: Tone) -> Self {
        Self {
            source,
            target_duration,
            tone,
            overlays: Vec::new(),
            logo: None,
            tagline: None,
        }
    }

    /// Whether the compositing stage has anything to draw.
    pub fn wants_overlays(&self) -> bool {
        !self.overlays.is_empty() || self.logo.is_some() || self.tagline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn bare_request_wants_no_overlays() {
        let req = TeaserRequest::new(
            MediaSource::Local(PathBuf::from("/tmp/a.mp4")),
            30.0,
            Tone::Professional,
        );
        assert!(!req.wants_overlays());

        let mut req = req;
        req.tagline = Some("Now available".to_string());
        assert!(req.wants_overlays());
    }
}
