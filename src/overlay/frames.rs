//! Raw frame transport to and from the transcoder.
//!
//! Decoding streams rgb24 frames over a pipe from one ffmpeg process;
//! encoding feeds mutated frames into a second ffmpeg process that also
//! muxes the original file's audio track back in.

use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use crate::errors::{MediaError, MediaResult};

/// Streams decoded rgb24 frames from a source file.
pub struct FrameDecoder {
    child: Child,
    stdout: ChildStdout,
}

impl FrameDecoder {
    pub fn spawn(source: &Path) -> MediaResult<Self> {
        let mut child = Command::new("ffmpeg")
            .args([
                "-v",
                "error",
                "-i",
                &source.display().to_string(),
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| MediaError::io("spawn ffmpeg decoder", e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MediaError::tool_failure("ffmpeg", -1, "decoder stdout unavailable"))?;

        Ok(Self { child, stdout })
    }

    /// Read the next frame into `buf`. Returns `false` on clean end of
    /// stream; a truncated frame is a corruption signal.
    pub fn next_frame(&mut self, buf: &mut [u8]) -> MediaResult<bool> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self
                .stdout
                .read(&mut buf[filled..])
                .map_err(|e| MediaError::io("read decoded frame", e))?;
            if n == 0 {
                if filled == 0 {
                    return Ok(false);
                }
                return Err(MediaError::tool_failure(
                    "ffmpeg",
                    -1,
                    format!("truncated frame: {} of {} bytes", filled, buf.len()),
                ));
            }
            filled += n;
        }
        Ok(true)
    }

    /// Wait for the decoder to exit after the stream is drained.
    pub fn finish(mut self) -> MediaResult<()> {
        let status = self
            .child
            .wait()
            .map_err(|e| MediaError::io("wait for ffmpeg decoder", e))?;
        if !status.success() {
            return Err(MediaError::tool_failure(
                "ffmpeg",
                status.code().unwrap_or(-1),
                "decoder exited with failure",
            ));
        }
        Ok(())
    }
}

impl Drop for FrameDecoder {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Encodes rgb24 frames written to it, muxing audio from `original`.
pub struct FrameEncoder {
    child: Child,
    stdin: Option<ChildStdin>,
}

impl FrameEncoder {
    pub fn spawn(
        original: &Path,
        output: &Path,
        width: u32,
        height: u32,
        fps: f64,
        preset: &str,
    ) -> MediaResult<Self> {
        let mut child = Command::new("ffmpeg")
            .args([
                "-y",
                "-v",
                "error",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "-s",
                &format!("{}x{}", width, height),
                "-r",
                &format!("{}", fps),
                "-i",
                "pipe:0",
                "-i",
                &original.display().to_string(),
                "-map",
                "0:v:0",
                "-map",
                "1:a:0?",
                "-c:v",
                "libx264",
                "-c:a",
                "aac",
                "-pix_fmt",
                "yuv420p",
                "-preset",
                preset,
                "-shortest",
                &output.display().to_string(),
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| MediaError::io("spawn ffmpeg encoder", e))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| MediaError::tool_failure("ffmpeg", -1, "encoder stdin unavailable"))?;

        Ok(Self {
            child,
            stdin: Some(stdin),
        })
    }

    pub fn write_frame(&mut self, buf: &[u8]) -> MediaResult<()> {
        if let Some(stdin) = self.stdin.as_mut() {
            stdin
                .write_all(buf)
                .map_err(|e| MediaError::io("write frame to encoder", e))?;
        }
        Ok(())
    }

    /// Close the input pipe and wait for the encode to complete.
    pub fn finish(mut self) -> MediaResult<()> {
        // Dropping stdin sends EOF so the encoder can flush and exit.
        self.stdin.take();
        let status = self
            .child
            .wait()
            .map_err(|e| MediaError::io("wait for ffmpeg encoder", e))?;
        if !status.success() {
            return Err(MediaError::tool_failure(
                "ffmpeg",
                status.code().unwrap_or(-1),
                "encoder exited with failure",
            ));
        }
        Ok(())
    }
}

impl Drop for FrameEncoder {
    fn drop(&mut self) {
        self.stdin.take();
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
