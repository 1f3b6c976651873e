//! Per-frame overlay compositing.
//!
//! Decodes the source to raw frames, mutates each frame that falls
//! inside an overlay window, and re-encodes with the original audio
//! muxed back in. Any failure after the pipeline starts yields the
//! unmodified input path instead of a partially-composited file.

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{RgbImage, RgbaImage};

use crate::config::OverlaySettings;
use crate::errors::{MediaError, MediaResult};
use crate::models::OverlayEntry;
use crate::probe;

use super::frames::{FrameDecoder, FrameEncoder};
use super::text;

/// A logo file with scoped deletion.
///
/// Upload flows hand the compositor a file written just for this run;
/// the guard removes it when the run ends, success or failure.
pub struct TempLogo {
    path: PathBuf,
}

impl TempLogo {
    /// Write logo bytes to `dir` and take ownership of the file.
    pub fn write(bytes: &[u8], dir: &Path) -> MediaResult<Self> {
        let path = dir.join("temp_logo.png");
        std::fs::write(&path, bytes).map_err(|e| MediaError::io("write logo file", e))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempLogo {
    fn drop(&mut self) {
        if self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                tracing::warn!("Failed to remove logo {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Burns captions, a logo, and a tagline into video frames.
pub struct Compositor {
    settings: OverlaySettings,
}

impl Compositor {
    pub fn new(settings: OverlaySettings) -> Self {
        Self { settings }
    }

    /// Composite overlays onto `video`, writing the result to `out_dir`.
    ///
    /// With nothing to draw this returns the input path untouched. When
    /// rendering fails mid-stream the partial output is removed and the
    /// original path is returned; compositing never surfaces a corrupt
    /// file.
    pub fn composite(
        &self,
        video: &Path,
        overlays: &[OverlayEntry],
        logo: Option<&Path>,
        tagline: Option<&str>,
        out_dir: &Path,
    ) -> MediaResult<PathBuf> {
        probe::ensure_exists(video)?;

        if overlays.is_empty() && logo.is_none() && tagline.is_none() {
            return Ok(video.to_path_buf());
        }

        let stem = video
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("video");
        let output = out_dir.join(format!("overlaid_{}.mp4", stem));

        match self.render(video, overlays, logo, tagline, &output) {
            Ok(()) => Ok(output),
            Err(e) => {
                tracing::warn!(
                    "Overlay compositing failed ({}); emitting unmodified input",
                    e
                );
                if output.exists() {
                    if let Err(e) = std::fs::remove_file(&output) {
                        tracing::warn!("Failed to remove partial {}: {}", output.display(), e);
                    }
                }
                Ok(video.to_path_buf())
            }
        }
    }

    fn render(
        &self,
        video: &Path,
        overlays: &[OverlayEntry],
        logo: Option<&Path>,
        tagline: Option<&str>,
        output: &Path,
    ) -> MediaResult<()> {
        let props = probe::probe_video_properties(video)?;
        let interval = props.frame_interval();

        let font = if !overlays.is_empty() || tagline.is_some() {
            Some(text::load_font(Path::new(&self.settings.font_path))?)
        } else {
            None
        };
        let logo_image = match logo {
            Some(path) => Some(self.load_logo(path)?),
            None => None,
        };

        let mut decoder = FrameDecoder::spawn(video)?;
        let mut encoder = FrameEncoder::spawn(
            video,
            output,
            props.width,
            props.height,
            props.fps,
            &self.settings.preset,
        )?;

        let frame_len = (props.width * props.height * 3) as usize;
        let mut buf = vec![0u8; frame_len];
        let mut index: u64 = 0;

        while decoder.next_frame(&mut buf)? {
            let timestamp = index as f64 * interval;
            let mut frame = RgbImage::from_raw(props.width, props.height, std::mem::take(&mut buf))
                .ok_or_else(|| {
                    MediaError::corrupt(video, "decoded frame does not match probed dimensions")
                })?;

            if let Some(font) = &font {
                if let Some(entry) = active_overlay(overlays, timestamp) {
                    text::draw_caption(
                        &mut frame,
                        font,
                        &entry.text,
                        self.settings.caption_font_size,
                    );
                }
                if let Some(tagline) = tagline {
                    text::draw_tagline(
                        &mut frame,
                        font,
                        tagline,
                        self.settings.tagline_font_size,
                        self.settings.tagline_padding,
                    );
                }
            }
            if let Some(logo) = &logo_image {
                let margin = self.settings.logo_margin as i64;
                blit_logo(&mut frame, logo, margin, margin);
            }

            encoder.write_frame(frame.as_raw())?;
            buf = frame.into_raw();
            index += 1;
        }

        decoder.finish()?;
        encoder.finish()?;
        tracing::debug!("Composited {} frames into {}", index, output.display());
        Ok(())
    }

    fn load_logo(&self, path: &Path) -> MediaResult<RgbaImage> {
        let size = self.settings.logo_size;
        let img = image::open(path).map_err(|e| {
            MediaError::invalid_source(format!("cannot open logo {}: {}", path.display(), e))
        })?;
        Ok(img.resize_exact(size, size, FilterType::Triangle).to_rgba8())
    }
}

/// The overlay rendered at `timestamp`: first entry in list order whose
/// window contains it, even when windows overlap.
fn active_overlay(overlays: &[OverlayEntry], timestamp: f64) -> Option<&OverlayEntry> {
    overlays.iter().find(|entry| entry.contains(timestamp))
}

/// Alpha-blend a logo onto the frame at the given offset, clipping at
/// the frame edges.
fn blit_logo(frame: &mut RgbImage, logo: &RgbaImage, x0: i64, y0: i64) {
    let (fw, fh) = (frame.width() as i64, frame.height() as i64);

    for (lx, ly, pixel) in logo.enumerate_pixels() {
        let x = x0 + lx as i64;
        let y = y0 + ly as i64;
        if x < 0 || y < 0 || x >= fw || y >= fh {
            continue;
        }

        let alpha = pixel[3] as u32;
        if alpha == 0 {
            continue;
        }
        let dst = frame.get_pixel_mut(x as u32, y as u32);
        for c in 0..3 {
            let src = pixel[c] as u32;
            let old = dst[c] as u32;
            dst[c] = ((src * alpha + old * (255 - alpha)) / 255) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    fn entry(start: f64, end: f64, text: &str) -> OverlayEntry {
        OverlayEntry::new(start, end, text)
    }

    #[test]
    fn overlapping_windows_pick_first_listed() {
        let overlays = vec![entry(0.0, 10.0, "first"), entry(5.0, 15.0, "second")];

        let active = active_overlay(&overlays, 7.0).unwrap();
        assert_eq!(active.text, "first");

        // Past the first window the second takes over.
        let active = active_overlay(&overlays, 12.0).unwrap();
        assert_eq!(active.text, "second");

        assert!(active_overlay(&overlays, 20.0).is_none());
    }

    #[test]
    fn blit_clips_at_frame_edges() {
        let mut frame = RgbImage::from_pixel(20, 20, image::Rgb([10, 10, 10]));
        let logo = RgbaImage::from_pixel(10, 10, Rgba([200, 0, 0, 255]));

        // Offset pushes half the logo outside; must not panic.
        blit_logo(&mut frame, &logo, 15, 15);

        assert_eq!(frame.get_pixel(16, 16), &image::Rgb([200, 0, 0]));
        assert_eq!(frame.get_pixel(10, 10), &image::Rgb([10, 10, 10]));
    }

    #[test]
    fn blit_blends_by_alpha() {
        let mut frame = RgbImage::from_pixel(4, 4, image::Rgb([0, 0, 0]));

        let transparent = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 0]));
        blit_logo(&mut frame, &transparent, 0, 0);
        assert_eq!(frame.get_pixel(0, 0), &image::Rgb([0, 0, 0]));

        let half = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 128]));
        blit_logo(&mut frame, &half, 0, 0);
        let px = frame.get_pixel(0, 0);
        assert!(px[0] > 100 && px[0] < 150, "expected ~half blend, got {:?}", px);
    }

    #[test]
    fn nothing_to_draw_returns_input_untouched() {
        let dir = tempdir().unwrap();
        let video = dir.path().join("clip.mp4");
        std::fs::write(&video, b"stub").unwrap();

        let compositor = Compositor::new(OverlaySettings::default());
        let result = compositor
            .composite(&video, &[], None, None, dir.path())
            .unwrap();
        assert_eq!(result, video);
    }

    #[test]
    fn failed_render_emits_unmodified_input() {
        let dir = tempdir().unwrap();
        let video = dir.path().join("clip.mp4");
        std::fs::write(&video, b"not a real container").unwrap();

        // Probing the stub fails, so rendering cannot start; the
        // original path comes back instead of an error.
        let compositor = Compositor::new(OverlaySettings::default());
        let result = compositor
            .composite(&video, &[entry(0.0, 5.0, "Hello")], None, None, dir.path())
            .unwrap();
        assert_eq!(result, video);
        assert!(!dir.path().join("overlaid_clip.mp4").exists());
    }

    #[test]
    fn temp_logo_removed_on_drop() {
        let dir = tempdir().unwrap();
        let path = {
            let logo = TempLogo::write(b"\x89PNG fake", dir.path()).unwrap();
            assert!(logo.path().exists());
            logo.path().to_path_buf()
        };
        assert!(!path.exists());
    }
}
