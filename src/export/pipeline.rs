use std::{cell::Cell, fmt, path::PathBuf};

use crate::{
    export::{
        request::{ExportRequest, ExportSettings},
        save::SaveAction,
        service::RenderService,
    },
    foundation::error::RibbonError,
    params::model::ParameterModel,
    source::image::ImageSource,
};

/// Export control state. `Done` and `Failed` are only ever passed through on the way
/// back to `Idle`; the pipeline never rests in them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportState {
    #[default]
    Idle,
    Pending,
    Done,
    Failed,
}

/// User-facing messages raised by an export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// Export was requested before any image was uploaded.
    MissingInput,
    /// The service answered with a non-success status.
    ServiceRejected { status: u16 },
    /// The exchange failed; details are in the logs only.
    ExportFailed,
    /// The video was written to disk.
    Saved { path: PathBuf },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput => f.write_str("Please upload an image before exporting."),
            Self::ServiceRejected { status } => {
                write!(f, "Export failed: the render service returned status {status}.")
            }
            Self::ExportFailed => f.write_str("Export failed. Please try again."),
            Self::Saved { path } => write!(f, "Saved {}", path.display()),
        }
    }
}

/// Terminal result of one [`ExportPipeline::export`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    Saved(PathBuf),
    MissingInput,
    Rejected { status: u16 },
    Failed,
    /// Another export was already pending; nothing was sent.
    Ignored,
}

/// Observer for state transitions and notices.
pub trait ExportEvents {
    fn state_changed(&self, state: ExportState);
    fn notice(&self, notice: &Notice);
}

/// [`ExportEvents`] that only logs.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEvents;

impl ExportEvents for TracingEvents {
    fn state_changed(&self, state: ExportState) {
        tracing::debug!(?state, "export state");
    }

    fn notice(&self, notice: &Notice) {
        match notice {
            Notice::Saved { .. } => tracing::info!("{notice}"),
            _ => tracing::warn!("{notice}"),
        }
    }
}

impl<E: ExportEvents + ?Sized> ExportEvents for &E {
    fn state_changed(&self, state: ExportState) {
        (**self).state_changed(state)
    }

    fn notice(&self, notice: &Notice) {
        (**self).notice(notice)
    }
}

/// Snapshot → request → save, one exchange at a time.
///
/// All methods take `&self`: a second `export` issued while the first is awaiting
/// the service observes `Pending` and returns [`ExportOutcome::Ignored`].
pub struct ExportPipeline<S, W, E = TracingEvents> {
    service: S,
    saver: W,
    events: E,
    settings: ExportSettings,
    state: Cell<ExportState>,
}

/// Puts the pipeline back to `Idle` on every exit path, including a dropped future.
struct PendingGuard<'a, E: ExportEvents> {
    state: &'a Cell<ExportState>,
    events: &'a E,
}

impl<E: ExportEvents> Drop for PendingGuard<'_, E> {
    fn drop(&mut self) {
        self.state.set(ExportState::Idle);
        self.events.state_changed(ExportState::Idle);
    }
}

impl<S, W, E> ExportPipeline<S, W, E>
where
    S: RenderService,
    W: SaveAction,
    E: ExportEvents,
{
    pub fn new(service: S, saver: W, events: E, settings: ExportSettings) -> Self {
        Self {
            service,
            saver,
            events,
            settings,
            state: Cell::new(ExportState::Idle),
        }
    }

    pub fn state(&self) -> ExportState {
        self.state.get()
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Export the current image at the current display width.
    ///
    /// The image and width are captured before the first suspend point; later edits
    /// do not affect a request already in flight.
    #[tracing::instrument(skip_all)]
    pub async fn export(&self, source: &ImageSource, params: &ParameterModel) -> ExportOutcome {
        if self.state.get() == ExportState::Pending {
            tracing::debug!("export already pending, ignoring");
            return ExportOutcome::Ignored;
        }

        let Some(image) = source.current() else {
            self.events.notice(&Notice::MissingInput);
            return ExportOutcome::MissingInput;
        };
        let request = ExportRequest::new(&image, params.width(), &self.settings);

        self.state.set(ExportState::Pending);
        self.events.state_changed(ExportState::Pending);
        let _guard = PendingGuard {
            state: &self.state,
            events: &self.events,
        };

        tracing::info!(
            width = request.width,
            height = request.height,
            duration = request.duration,
            "export started"
        );

        match self.exchange(&request).await {
            Ok(path) => {
                self.events.state_changed(ExportState::Done);
                self.events.notice(&Notice::Saved { path: path.clone() });
                ExportOutcome::Saved(path)
            }
            Err(RibbonError::Rejected { status }) => {
                tracing::warn!(status, "render service rejected export");
                self.events.state_changed(ExportState::Failed);
                self.events.notice(&Notice::ServiceRejected { status });
                ExportOutcome::Rejected { status }
            }
            Err(e) => {
                tracing::error!(error = %e, "export failed");
                self.events.state_changed(ExportState::Failed);
                self.events.notice(&Notice::ExportFailed);
                ExportOutcome::Failed
            }
        }
    }

    async fn exchange(&self, request: &ExportRequest) -> Result<PathBuf, RibbonError> {
        let response = self.service.render(request).await?;
        if !response.is_success() {
            return Err(RibbonError::Rejected {
                status: response.status,
            });
        }
        let path = self.saver.save(&request.filename, &response.body).await?;
        Ok(path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/pipeline.rs"]
mod tests;
