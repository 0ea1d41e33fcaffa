use std::time::Duration;

use crate::foundation::error::{RibbonError, RibbonResult};

/// Physical height of every ribbon board, in pixels.
pub const BOARD_HEIGHT: u32 = 40;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> RibbonResult<Self> {
        if den == 0 {
            return Err(RibbonError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(RibbonError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Wall-clock length of one frame, used to step the render engine offline.
    pub fn frame_duration(self) -> Duration {
        Duration::from_secs_f64(self.frame_duration_secs())
    }

    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64()).floor().max(0.0) as u64
    }
}

/// One rendered viewport frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    /// Straight (not premultiplied) RGBA8, row-major.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// Fully transparent frame of the given size.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; (width as usize) * (height as usize) * 4],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = &self.data[i..i + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn is_blank(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == 0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
