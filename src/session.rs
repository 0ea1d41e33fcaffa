use crate::{
    engine::loop_engine::RenderEngine,
    export::{
        pipeline::{ExportEvents, ExportOutcome, ExportPipeline},
        save::SaveAction,
        service::RenderService,
    },
    params::model::{ParameterModel, Params},
    source::image::ImageSource,
};

/// One operator session: the knobs, the uploaded image, the live preview and the
/// export control, all owned here and lent out by reference.
pub struct Session<S, W, E> {
    params: ParameterModel,
    source: ImageSource,
    engine: RenderEngine,
    export: ExportPipeline<S, W, E>,
}

impl<S, W, E> Session<S, W, E>
where
    S: RenderService,
    W: SaveAction,
    E: ExportEvents,
{
    pub fn new(initial: Params, export: ExportPipeline<S, W, E>) -> Self {
        let params = ParameterModel::new(initial);
        let source = ImageSource::new();
        let engine = RenderEngine::new(&params, &source);
        Self {
            params,
            source,
            engine,
            export,
        }
    }

    pub fn params(&self) -> &ParameterModel {
        &self.params
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    pub fn engine(&self) -> &RenderEngine {
        &self.engine
    }

    pub fn pipeline(&self) -> &ExportPipeline<S, W, E> {
        &self.export
    }

    /// Borrow everything at once so the preview can keep ticking while an export
    /// future holds shared references to the model and source.
    pub fn split(
        &mut self,
    ) -> (
        &ParameterModel,
        &ImageSource,
        &mut RenderEngine,
        &ExportPipeline<S, W, E>,
    ) {
        (&self.params, &self.source, &mut self.engine, &self.export)
    }

    pub async fn export(&self) -> ExportOutcome {
        self.export.export(&self.source, &self.params).await
    }
}
