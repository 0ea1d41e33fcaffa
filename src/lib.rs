//! Ribbon board motion preview and video export.
//!
//! An operator uploads one image, picks a scroll duration, a direction and one of the
//! physical board widths, and watches the image loop across a simulated 40px-tall
//! LED ribbon. The same image and width can then be sent to a remote render service,
//! whose MP4 answer is saved locally.
//!
//! # Pieces
//!
//! - [`ParameterModel`]: the three knobs, published over a watch channel.
//! - [`ImageSource`]: the single uploaded image as bytes plus a base64 data URL.
//! - [`RenderEngine`]: the seamless loop. The image is drawn twice edge to edge and
//!   translated by one copy width per cycle, so the seam never shows.
//! - [`ExportPipeline`]: one request/response exchange with the render service,
//!   guarded by an `Idle`/`Pending` state that always returns to `Idle`.
//!
//! Everything runs on one cooperative thread; only ingestion and the export exchange
//! suspend.
#![forbid(unsafe_code)]

pub mod config;
pub mod encode;
pub mod engine;
pub mod export;
pub mod foundation;
pub mod params;
pub mod session;
pub mod source;

pub use engine::loop_engine::RenderEngine;
pub use engine::strip::{CopyPlacement, Strip};
pub use engine::timeline::LoopTimeline;
pub use export::pipeline::{
    ExportEvents, ExportOutcome, ExportPipeline, ExportState, Notice, TracingEvents,
};
pub use export::request::{EXPORT_DURATION_SECS, EXPORT_FILENAME, ExportRequest, ExportSettings};
pub use export::save::{FsSaveAction, SaveAction};
pub use export::service::{HttpRenderService, RenderService, ServiceResponse};
pub use foundation::core::{BOARD_HEIGHT, Fps, FrameIndex, FrameRGBA};
pub use foundation::error::{RibbonError, RibbonResult};
pub use params::model::{
    Direction, DisplayWidth, ParameterModel, Params, Playback, ScrollDuration,
};
pub use session::Session;
pub use source::image::{ImageSource, SourceImage};
