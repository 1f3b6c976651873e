//! Video-hosting URL validation.
//!
//! Fetching is only attempted for recognized video-host URLs; anything
//! else is rejected before any filesystem side effect.

use std::sync::OnceLock;

use regex::Regex;

/// Watch/embed/short-link forms on the recognized video hosts, ending in
/// an 11-character video id.
const VIDEO_URL_PATTERN: &str = r"^(https?://)?(www\.)?(youtube|youtu|youtube-nocookie)\.(com|be)/(watch\?v=|embed/|v/|.+\?v=)?([^&=%\?]{11})";

fn video_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VIDEO_URL_PATTERN).expect("static pattern compiles"))
}

/// Whether the URL matches the recognized video-host shape.
pub fn is_supported_video_url(url: &str) -> bool {
    video_url_regex().is_match(url)
}

/// Extract the 11-character video id, if present.
pub fn video_id(url: &str) -> Option<String> {
    video_url_regex()
        .captures(url)
        .and_then(|caps| caps.get(6))
        .map(|m| m.as_str().to_string())
}
