use anyhow::Context as _;
use image::{RgbaImage, imageops::FilterType};

use crate::{
    foundation::core::FrameRGBA,
    foundation::error::{RibbonError, RibbonResult},
    source::image::SourceImage,
};

/// Where one copy of the image sits inside the doubled strip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CopyPlacement {
    pub x: u32,
    pub width: u32,
}

impl CopyPlacement {
    pub fn end(self) -> u32 {
        self.x + self.width
    }
}

/// The source image scaled to board height, laid out twice edge to edge.
#[derive(Clone, Debug)]
pub struct Strip {
    copy: RgbaImage,
}

impl Strip {
    /// Decode `source` and scale it to `height`, keeping its aspect ratio.
    pub fn from_source(source: &SourceImage, height: u32) -> RibbonResult<Self> {
        let decoded = image::load_from_memory(source.bytes())
            .with_context(|| format!("decode {} source image", source.mime()))
            .map_err(|e| RibbonError::decode(format!("{e:#}")))?;
        Self::from_rgba(decoded.to_rgba8(), height)
    }

    pub fn from_rgba(rgba: RgbaImage, height: u32) -> RibbonResult<Self> {
        let (w, h) = rgba.dimensions();
        if w == 0 || h == 0 || height == 0 {
            return Err(RibbonError::decode("source image has no pixels"));
        }
        if h == height {
            return Ok(Self { copy: rgba });
        }
        let scaled_w = ((u64::from(w) * u64::from(height) + u64::from(h) / 2) / u64::from(h))
            .clamp(1, u64::from(u32::MAX)) as u32;
        let copy = image::imageops::resize(&rgba, scaled_w, height, FilterType::Triangle);
        Ok(Self { copy })
    }

    /// Width of a single copy, the distance travelled in one loop cycle.
    pub fn copy_width(&self) -> u32 {
        self.copy.width()
    }

    pub fn height(&self) -> u32 {
        self.copy.height()
    }

    /// The two placements. The second starts exactly where the first ends.
    pub fn layout(&self) -> [CopyPlacement; 2] {
        let width = self.copy_width();
        [
            CopyPlacement { x: 0, width },
            CopyPlacement { x: width, width },
        ]
    }

    pub fn total_width(&self) -> u32 {
        self.layout()[1].end()
    }

    /// Whether a viewport of `viewport_width` stays filled at every offset of the loop.
    pub fn covers(&self, viewport_width: u32) -> bool {
        viewport_width <= self.copy_width()
    }

    /// Paint the strip translated by `offset` (in `[-W, 0]`) into a `viewport_width` wide
    /// frame. Columns past the end of the second copy stay transparent.
    pub fn paint(&self, offset: f64, viewport_width: u32) -> FrameRGBA {
        let height = self.height();
        let mut frame = FrameRGBA::transparent(viewport_width, height);
        let w = self.copy_width();
        let shift = (-offset).round().max(0.0) as u64 % u64::from(w);
        let shift = shift as u32;
        let total = self.total_width();

        let src = self.copy.as_raw();
        let row_bytes = (w as usize) * 4;
        let dst_row_bytes = (viewport_width as usize) * 4;

        for y in 0..height as usize {
            let src_row = &src[y * row_bytes..(y + 1) * row_bytes];
            let dst_row = &mut frame.data[y * dst_row_bytes..(y + 1) * dst_row_bytes];

            let mut x = 0u32;
            while x < viewport_width {
                let s = x + shift;
                if s >= total {
                    break;
                }
                let col = s % w;
                let run = (w - col).min(viewport_width - x).min(total - s);
                let from = (col as usize) * 4;
                let to = (x as usize) * 4;
                let len = (run as usize) * 4;
                dst_row[to..to + len].copy_from_slice(&src_row[from..from + len]);
                x += run;
            }
        }
        frame
    }

    /// The whole doubled strip, untranslated.
    pub fn pixels(&self) -> FrameRGBA {
        self.paint(0.0, self.total_width())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/strip.rs"]
mod tests;
