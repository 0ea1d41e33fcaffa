use std::{fmt, str::FromStr, time::Duration};

use tokio::sync::watch;

use crate::foundation::error::{RibbonError, RibbonResult};

/// Seconds for one full traversal of the doubled image content.
///
/// Host controls clamp into [`ScrollDuration::MIN`]..=[`ScrollDuration::MAX`] with
/// [`ScrollDuration::clamped`]; the model and engine accept whatever they are handed.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ScrollDuration(u32);

impl ScrollDuration {
    pub const MIN: u32 = 5;
    pub const MAX: u32 = 120;

    /// Build a duration without range checks. Zero is bumped to one second so the
    /// loop period stays positive.
    pub fn from_secs(secs: u32) -> Self {
        Self(secs.max(1))
    }

    /// What a range slider would hand over.
    pub fn clamped(secs: u32) -> Self {
        Self(secs.clamp(Self::MIN, Self::MAX))
    }

    pub fn secs(self) -> u32 {
        self.0
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs(u64::from(self.0))
    }
}

impl Default for ScrollDuration {
    fn default() -> Self {
        Self(30)
    }
}

/// Which way content travels across the board.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Left,
    Right,
}

/// Animation playback order a [`Direction`] selects. The image itself is never mirrored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Playback {
    Normal,
    Reverse,
}

impl Direction {
    pub fn playback(self) -> Playback {
        match self {
            Self::Left => Playback::Normal,
            Self::Right => Playback::Reverse,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}

impl FromStr for Direction {
    type Err = RibbonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(RibbonError::validation(format!(
                "unknown direction '{other}' (expected left or right)"
            ))),
        }
    }
}

/// Physical board sizes. All boards are [`BOARD_HEIGHT`](crate::BOARD_HEIGHT) pixels tall.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub enum DisplayWidth {
    /// Lower ribbon, 4416x40.
    #[default]
    Lower,
    /// Upper ribbon, 10104x40.
    Upper,
    /// Upper ribbon wrapped around the full bowl, 20208x40.
    UpperFullWrap,
}

impl DisplayWidth {
    pub const ALL: [DisplayWidth; 3] = [Self::Lower, Self::Upper, Self::UpperFullWrap];

    pub fn pixels(self) -> u32 {
        match self {
            Self::Lower => 4416,
            Self::Upper => 10104,
            Self::UpperFullWrap => 20208,
        }
    }

    pub fn from_pixels(px: u32) -> RibbonResult<Self> {
        Self::ALL
            .into_iter()
            .find(|w| w.pixels() == px)
            .ok_or_else(|| {
                RibbonError::validation(format!(
                    "unsupported display width {px} (expected 4416, 10104 or 20208)"
                ))
            })
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Lower => "Lower (4416x40)",
            Self::Upper => "Upper (10104x40)",
            Self::UpperFullWrap => "Upper Full Wrap (20208x40)",
        }
    }
}

impl TryFrom<u32> for DisplayWidth {
    type Error = RibbonError;

    fn try_from(px: u32) -> Result<Self, Self::Error> {
        Self::from_pixels(px)
    }
}

impl From<DisplayWidth> for u32 {
    fn from(w: DisplayWidth) -> Self {
        w.pixels()
    }
}

impl FromStr for DisplayWidth {
    type Err = RibbonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "lower" => Ok(Self::Lower),
            "upper" => Ok(Self::Upper),
            "upper-full-wrap" | "full-wrap" | "wrap" => Ok(Self::UpperFullWrap),
            _ => {
                let px: u32 = s.parse().map_err(|_| {
                    RibbonError::validation(format!("unknown display width '{s}'"))
                })?;
                Self::from_pixels(px)
            }
        }
    }
}

/// Snapshot of the three preview knobs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Params {
    pub duration: ScrollDuration,
    pub direction: Direction,
    pub width: DisplayWidth,
}

/// Owner of the live [`Params`].
///
/// Every setter publishes immediately; the render engine holds a receiver from
/// [`ParameterModel::subscribe`] and picks the newest values up on its next tick.
#[derive(Debug)]
pub struct ParameterModel {
    tx: watch::Sender<Params>,
}

impl ParameterModel {
    pub fn new(initial: Params) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn get(&self) -> Params {
        *self.tx.borrow()
    }

    pub fn duration(&self) -> ScrollDuration {
        self.tx.borrow().duration
    }

    pub fn direction(&self) -> Direction {
        self.tx.borrow().direction
    }

    pub fn width(&self) -> DisplayWidth {
        self.tx.borrow().width
    }

    pub fn set_duration(&self, duration: ScrollDuration) {
        tracing::debug!(secs = duration.secs(), "scroll duration changed");
        self.tx.send_modify(|p| p.duration = duration);
    }

    pub fn set_direction(&self, direction: Direction) {
        tracing::debug!(%direction, "scroll direction changed");
        self.tx.send_modify(|p| p.direction = direction);
    }

    pub fn set_width(&self, width: DisplayWidth) {
        tracing::debug!(px = width.pixels(), "display width changed");
        self.tx.send_modify(|p| p.width = width);
    }

    pub fn subscribe(&self) -> watch::Receiver<Params> {
        self.tx.subscribe()
    }
}

impl Default for ParameterModel {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/params/model.rs"]
mod tests;
