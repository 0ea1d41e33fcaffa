use std::path::Path;

use crate::{
    encode::ffmpeg::PreviewEncoder,
    engine::loop_engine::RenderEngine,
    foundation::{
        core::{Fps, FrameIndex},
        error::{RibbonError, RibbonResult},
    },
};

/// Drive `engine` with a fixed frame clock and encode `frames` viewport frames to MP4.
///
/// The engine's live clock advances as it would on screen, so parameter changes
/// published while this runs are honoured at the next frame.
#[tracing::instrument(skip(engine), fields(out = %out_path.display()))]
pub fn render_preview_mp4(
    engine: &mut RenderEngine,
    fps: Fps,
    frames: u64,
    out_path: &Path,
) -> RibbonResult<u64> {
    if frames == 0 {
        return Err(RibbonError::validation("preview needs at least one frame"));
    }

    engine.sync();
    let mut encoder = PreviewEncoder::spawn(out_path, engine.live_params().width, fps)?;
    let dt = fps.frame_duration();

    for f in 0..frames {
        if f > 0 {
            engine.tick(dt);
        }
        encoder.push(&engine.render()).map_err(|e| {
            tracing::error!(frame = ?FrameIndex(f), error = %e, "preview frame rejected");
            e
        })?;
    }

    let written = encoder.finish()?;
    tracing::info!(frames = written, secs = fps.frames_to_secs(written), "preview written");
    Ok(written)
}
