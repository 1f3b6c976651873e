//! Data model shared across the pipeline.

mod enums;
mod media;
mod request;

pub use enums::{ContainerFormat, ExtractMode, Tone};
pub use media::{
    is_video_file, Highlight, MediaSource, OutputArtifact, OverlayEntry, SUPPORTED_VIDEO_EXTENSIONS,
};
pub use request::TeaserRequest;
