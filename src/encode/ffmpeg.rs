//! Local preview video through the system `ffmpeg` binary.
//!
//! Board frames are straight-alpha RGBA. The empty tail of a narrow strip is
//! transparent, and an LED that is off is black, so every frame is composited over
//! black before it is piped to the encoder.

use std::{
    ffi::OsString,
    io::{self, Write as _},
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use anyhow::Context as _;

use crate::{
    foundation::{
        core::{BOARD_HEIGHT, Fps, FrameRGBA},
        error::{RibbonError, RibbonResult},
    },
    params::model::DisplayWidth,
};

const FFMPEG: &str = "ffmpeg";

/// A running `ffmpeg` that turns board frames into an H.264 MP4.
pub struct PreviewEncoder {
    width: DisplayWidth,
    out: PathBuf,
    child: Child,
    stdin: Option<ChildStdin>,
    opaque: Vec<u8>,
    written: u64,
}

impl PreviewEncoder {
    /// Start encoding `width`x40 frames at `fps` into `out`, replacing any existing file.
    pub fn spawn(out: &Path, width: DisplayWidth, fps: Fps) -> RibbonResult<Self> {
        Self::spawn_program(Path::new(FFMPEG), out, width, fps)
    }

    fn spawn_program(
        program: &Path,
        out: &Path,
        width: DisplayWidth,
        fps: Fps,
    ) -> RibbonResult<Self> {
        if fps.den != 1 {
            return Err(RibbonError::validation(
                "preview encoding needs an integral frame rate",
            ));
        }
        if let Some(dir) = out.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create preview directory '{}'", dir.display()))?;
        }

        let mut child = Command::new(program)
            .args(encoder_args(width, fps, out))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => RibbonError::encode(format!(
                    "'{}' was not found on PATH; install ffmpeg to render previews",
                    program.display()
                )),
                _ => RibbonError::encode(format!("could not start '{}': {e}", program.display())),
            })?;
        let stdin = child.stdin.take();

        tracing::debug!(px = width.pixels(), fps = fps.num, out = %out.display(), "encoder started");
        Ok(Self {
            width,
            out: out.to_path_buf(),
            child,
            stdin,
            opaque: vec![0; frame_len(width)],
            written: 0,
        })
    }

    /// Composite `frame` over black and hand it to the encoder.
    pub fn push(&mut self, frame: &FrameRGBA) -> RibbonResult<()> {
        if frame.width != self.width.pixels() || frame.height != BOARD_HEIGHT {
            return Err(RibbonError::validation(format!(
                "frame is {}x{}, encoder expects {}x{BOARD_HEIGHT}",
                frame.width,
                frame.height,
                self.width.pixels()
            )));
        }
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(RibbonError::encode("encoder input is closed"));
        };

        over_black(&mut self.opaque, &frame.data);
        stdin.write_all(&self.opaque).map_err(|e| {
            RibbonError::encode(format!(
                "ffmpeg stopped accepting frames after {}: {e}",
                self.written
            ))
        })?;
        self.written += 1;
        Ok(())
    }

    /// Close the input, wait for `ffmpeg` and return the number of frames it received.
    pub fn finish(mut self) -> RibbonResult<u64> {
        drop(self.stdin.take());
        let output = self
            .child
            .wait_with_output()
            .context("wait for ffmpeg to exit")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RibbonError::encode(format!(
                "ffmpeg failed writing '{}' ({}): {}",
                self.out.display(),
                output.status,
                stderr.trim()
            )));
        }
        Ok(self.written)
    }
}

fn frame_len(width: DisplayWidth) -> usize {
    (width.pixels() as usize) * (BOARD_HEIGHT as usize) * 4
}

fn encoder_args(width: DisplayWidth, fps: Fps, out: &Path) -> Vec<OsString> {
    let size = format!("{}x{BOARD_HEIGHT}", width.pixels());
    let rate = fps.num.to_string();
    let mut args: Vec<OsString> = [
        "-hide_banner",
        "-loglevel",
        "error",
        "-y",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "-video_size",
        size.as_str(),
        "-framerate",
        rate.as_str(),
        "-i",
        "-",
        "-an",
        "-c:v",
        "libx264",
        "-pix_fmt",
        "yuv420p",
        "-movflags",
        "+faststart",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    args.push(out.as_os_str().to_owned());
    args
}

/// Straight-alpha RGBA over an opaque black board. `dst` and `src` have equal length.
fn over_black(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u32::from(s[3]);
        for c in 0..3 {
            d[c] = ((u32::from(s[c]) * a + 127) / 255) as u8;
        }
        d[3] = 255;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
