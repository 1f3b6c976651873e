//! Text rendering onto raw frames.

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::errors::{MediaError, MediaResult};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Load a TTF/OTF font from disk.
///
/// A missing or malformed font file is a normal failure here; the
/// compositor treats it as a reason to skip overlaying entirely.
pub fn load_font(path: &Path) -> MediaResult<FontVec> {
    let bytes = std::fs::read(path).map_err(|e| MediaError::io("read font file", e))?;
    FontVec::try_from_vec(bytes).map_err(|_| {
        MediaError::invalid_source(format!("not a usable font file: {}", path.display()))
    })
}

/// Draw a caption centered near the bottom of the frame, white with a
/// black outline for contrast on arbitrary footage.
pub fn draw_caption(frame: &mut RgbImage, font: &FontVec, text: &str, size: u32) {
    let scale = PxScale::from(size as f32);
    let (text_w, text_h) = text_size(scale, font, text);

    let x = (frame.width().saturating_sub(text_w) / 2) as i32;
    let y = frame
        .height()
        .saturating_sub(text_h + frame.height() / 10) as i32;

    for (dx, dy) in [(-2, 0), (2, 0), (0, -2), (0, 2)] {
        draw_text_mut(frame, BLACK, x + dx, y + dy, scale, font, text);
    }
    draw_text_mut(frame, WHITE, x, y, scale, font, text);
}

/// Draw the tagline centered near the top, white on an opaque black
/// rectangle sized to the text plus padding.
pub fn draw_tagline(frame: &mut RgbImage, font: &FontVec, text: &str, size: u32, padding: u32) {
    let scale = PxScale::from(size as f32);
    let (text_w, text_h) = text_size(scale, font, text);

    let x = (frame.width().saturating_sub(text_w) / 2) as i32;
    let y = padding as i32;

    let rect_w = (text_w + 2 * padding).min(frame.width());
    let rect_h = (text_h + 2 * padding).min(frame.height());
    let rect_x = (x - padding as i32).max(0);
    draw_filled_rect_mut(
        frame,
        Rect::at(rect_x, 0).of_size(rect_w, rect_h),
        BLACK,
    );
    draw_text_mut(frame, WHITE, x, y, scale, font, text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn garbage_bytes_are_not_a_font() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fake.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();

        let result = load_font(&path);
        assert!(matches!(result, Err(MediaError::InvalidSource { .. })));
    }

    #[test]
    fn missing_font_is_io_error() {
        let dir = tempdir().unwrap();
        let result = load_font(&dir.path().join("nope.ttf"));
        assert!(matches!(result, Err(MediaError::Io { .. })));
    }
}
