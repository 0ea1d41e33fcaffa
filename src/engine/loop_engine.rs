use std::{sync::Arc, time::Duration};

use tokio::sync::watch;

use crate::{
    engine::{
        strip::{CopyPlacement, Strip},
        timeline::LoopTimeline,
    },
    foundation::core::{BOARD_HEIGHT, FrameRGBA},
    params::model::{ParameterModel, Params},
    source::image::{ImageSource, SourceImage},
};

/// Live simulation of the ribbon board viewport.
///
/// The engine owns its own clock (a loop phase in `[0, 1)`) and only reads the
/// parameter model and image source through watch receivers. Pending changes are
/// applied at the start of every [`tick`](Self::tick) or explicit [`sync`](Self::sync):
///
/// - a duration change keeps the current phase, so the strip does not jump;
/// - a direction change restarts the cycle at its start point;
/// - a new image rebuilds the strip and keeps the phase.
#[derive(Debug)]
pub struct RenderEngine {
    params_rx: watch::Receiver<Params>,
    source_rx: watch::Receiver<Option<Arc<SourceImage>>>,
    live: Params,
    phase: f64,
    strip: Option<Strip>,
}

impl RenderEngine {
    pub fn new(params: &ParameterModel, source: &ImageSource) -> Self {
        let mut engine = Self {
            params_rx: params.subscribe(),
            source_rx: source.subscribe(),
            live: params.get(),
            phase: 0.0,
            strip: None,
        };
        let current = source.current();
        engine.rebuild_strip(current.as_deref());
        engine
    }

    /// Apply whatever the model and source published since the last sync.
    pub fn sync(&mut self) {
        if self.params_rx.has_changed().unwrap_or(false) {
            let next = *self.params_rx.borrow_and_update();
            self.apply_params(next);
        }

        if self.source_rx.has_changed().unwrap_or(false) {
            let next = self.source_rx.borrow_and_update().clone();
            self.rebuild_strip(next.as_deref());
        }
    }

    fn apply_params(&mut self, next: Params) {
        if next.direction != self.live.direction {
            tracing::debug!(direction = %next.direction, "direction changed, restarting cycle");
            self.phase = 0.0;
        }
        if next.duration != self.live.duration {
            tracing::debug!(
                secs = next.duration.secs(),
                phase = self.phase,
                "duration changed, phase kept"
            );
        }
        self.live = next;
    }

    fn rebuild_strip(&mut self, source: Option<&SourceImage>) {
        self.strip = match source {
            None => None,
            Some(src) => match Strip::from_source(src, BOARD_HEIGHT) {
                Ok(strip) => {
                    tracing::debug!(copy_width = strip.copy_width(), "strip rebuilt");
                    Some(strip)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "source image not renderable, viewport left empty");
                    None
                }
            },
        };
    }

    /// Advance the loop clock by `dt` using the newest parameters.
    pub fn tick(&mut self, dt: Duration) {
        self.sync();
        self.phase = self.timeline().advance(self.phase, dt);
    }

    pub fn timeline(&self) -> LoopTimeline {
        LoopTimeline::new(self.live.duration, self.live.direction)
    }

    /// Parameters currently driving the animation.
    pub fn live_params(&self) -> Params {
        self.live
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn strip(&self) -> Option<&Strip> {
        self.strip.as_ref()
    }

    pub fn layout(&self) -> Option<[CopyPlacement; 2]> {
        self.strip.as_ref().map(Strip::layout)
    }

    /// Current translation of the strip in pixels, `0.0` when there is nothing to show.
    pub fn offset(&self) -> f64 {
        self.strip
            .as_ref()
            .map(|s| self.timeline().offset_at_phase(self.phase, s.copy_width()))
            .unwrap_or(0.0)
    }

    pub fn viewport_width(&self) -> u32 {
        self.live.width.pixels()
    }

    /// Paint the viewport at the current phase.
    pub fn render(&self) -> FrameRGBA {
        match &self.strip {
            Some(strip) => strip.paint(self.offset(), self.viewport_width()),
            None => FrameRGBA::transparent(self.viewport_width(), BOARD_HEIGHT),
        }
    }

    /// Paint the viewport as it looks `elapsed` into uninterrupted playback from the
    /// cycle start. Does not touch the live clock.
    pub fn render_at(&self, elapsed: Duration) -> FrameRGBA {
        match &self.strip {
            Some(strip) => {
                let offset = self.timeline().offset_at(elapsed, strip.copy_width());
                strip.paint(offset, self.viewport_width())
            }
            None => FrameRGBA::transparent(self.viewport_width(), BOARD_HEIGHT),
        }
    }

    /// The doubled content, untranslated and unclipped.
    pub fn strip_pixels(&self) -> Option<FrameRGBA> {
        self.strip.as_ref().map(Strip::pixels)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/loop_engine.rs"]
mod tests;
