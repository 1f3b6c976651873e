//! Overlay compositing: captions, logo, and tagline burned into frames.

mod compositor;
mod frames;
mod text;

pub use compositor::{Compositor, TempLogo};
pub use frames::{FrameDecoder, FrameEncoder};
pub use text::load_font;
