use std::{
    cell::{Cell, RefCell},
    path::Path,
    rc::Rc,
};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::*;
use crate::{
    export::service::ServiceResponse,
    foundation::error::RibbonResult,
    params::model::DisplayWidth,
};

enum Script {
    Ok(Vec<u8>),
    Status(u16),
    Transport,
}

struct FakeService {
    script: Script,
    calls: Cell<usize>,
    last: RefCell<Option<ExportRequest>>,
    gate: Option<Rc<Notify>>,
}

impl FakeService {
    fn new(script: Script) -> Self {
        Self {
            script,
            calls: Cell::new(0),
            last: RefCell::new(None),
            gate: None,
        }
    }

    fn gated(script: Script, gate: Rc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(script)
        }
    }
}

#[async_trait(?Send)]
impl RenderService for FakeService {
    async fn render(&self, request: &ExportRequest) -> RibbonResult<ServiceResponse> {
        self.calls.set(self.calls.get() + 1);
        *self.last.borrow_mut() = Some(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.script {
            Script::Ok(body) => Ok(ServiceResponse {
                status: 200,
                body: body.clone(),
            }),
            Script::Status(status) => Ok(ServiceResponse {
                status: *status,
                body: Vec::new(),
            }),
            Script::Transport => Err(RibbonError::transport("connection reset")),
        }
    }
}

#[derive(Default)]
struct FakeSaver {
    saved: RefCell<Vec<(String, Vec<u8>)>>,
    disk_full: bool,
}

#[async_trait(?Send)]
impl SaveAction for FakeSaver {
    async fn save(&self, filename: &str, bytes: &[u8]) -> RibbonResult<PathBuf> {
        if self.disk_full {
            return Err(anyhow::anyhow!("no space left on device").into());
        }
        self.saved
            .borrow_mut()
            .push((filename.to_string(), bytes.to_vec()));
        Ok(Path::new("/downloads").join(filename))
    }
}

#[derive(Default)]
struct Recorder {
    states: RefCell<Vec<ExportState>>,
    notices: RefCell<Vec<Notice>>,
}

impl ExportEvents for Recorder {
    fn state_changed(&self, state: ExportState) {
        self.states.borrow_mut().push(state);
    }

    fn notice(&self, notice: &Notice) {
        self.notices.borrow_mut().push(notice.clone());
    }
}

fn pipeline(service: FakeService) -> ExportPipeline<FakeService, FakeSaver, Recorder> {
    ExportPipeline::new(
        service,
        FakeSaver::default(),
        Recorder::default(),
        ExportSettings::default(),
    )
}

fn loaded_source() -> ImageSource {
    let source = ImageSource::new();
    source.ingest_bytes(b"\x89PNG\r\n\x1a\nfake".to_vec(), None);
    source
}

#[tokio::test]
async fn missing_image_never_calls_service() {
    let p = pipeline(FakeService::new(Script::Ok(vec![1])));
    let outcome = p.export(&ImageSource::new(), &ParameterModel::default()).await;

    assert_eq!(outcome, ExportOutcome::MissingInput);
    assert_eq!(p.service.calls.get(), 0);
    assert_eq!(p.state(), ExportState::Idle);
    assert!(p.events.states.borrow().is_empty());
    assert_eq!(*p.events.notices.borrow(), vec![Notice::MissingInput]);
}

#[tokio::test]
async fn success_saves_once_under_fixed_filename() {
    let p = pipeline(FakeService::new(Script::Ok(b"mp4-bytes".to_vec())));
    let params = ParameterModel::default();
    params.set_width(DisplayWidth::UpperFullWrap);

    let outcome = p.export(&loaded_source(), &params).await;

    assert_eq!(
        outcome,
        ExportOutcome::Saved(PathBuf::from("/downloads/ribbon-output.mp4"))
    );
    assert_eq!(
        *p.events.states.borrow(),
        vec![ExportState::Pending, ExportState::Done, ExportState::Idle]
    );
    assert_eq!(p.state(), ExportState::Idle);

    let saved = p.saver.saved.borrow();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].0, "ribbon-output.mp4");
    assert_eq!(saved[0].1, b"mp4-bytes");

    let req = p.service.last.borrow().clone().unwrap();
    assert_eq!(req.width, 20208);
    assert_eq!(req.height, 40);
    assert_eq!(req.duration, 15);
}

#[tokio::test]
async fn rejected_status_surfaces_one_notice_and_no_save() {
    let p = pipeline(FakeService::new(Script::Status(500)));
    let outcome = p.export(&loaded_source(), &ParameterModel::default()).await;

    assert_eq!(outcome, ExportOutcome::Rejected { status: 500 });
    assert!(p.saver.saved.borrow().is_empty());
    assert_eq!(
        *p.events.notices.borrow(),
        vec![Notice::ServiceRejected { status: 500 }]
    );
    assert_eq!(
        *p.events.states.borrow(),
        vec![ExportState::Pending, ExportState::Failed, ExportState::Idle]
    );
}

#[tokio::test]
async fn transport_failure_surfaces_generic_notice_and_no_save() {
    let p = pipeline(FakeService::new(Script::Transport));
    let outcome = p.export(&loaded_source(), &ParameterModel::default()).await;

    assert_eq!(outcome, ExportOutcome::Failed);
    assert!(p.saver.saved.borrow().is_empty());
    assert_eq!(*p.events.notices.borrow(), vec![Notice::ExportFailed]);
    assert_eq!(
        *p.events.states.borrow(),
        vec![ExportState::Pending, ExportState::Failed, ExportState::Idle]
    );
    assert_eq!(p.state(), ExportState::Idle);
}

#[tokio::test]
async fn save_failure_after_success_status_is_a_generic_failure() {
    let p = ExportPipeline::new(
        FakeService::new(Script::Ok(b"mp4-bytes".to_vec())),
        FakeSaver {
            disk_full: true,
            ..FakeSaver::default()
        },
        Recorder::default(),
        ExportSettings::default(),
    );
    let outcome = p.export(&loaded_source(), &ParameterModel::default()).await;

    assert_eq!(outcome, ExportOutcome::Failed);
    assert_eq!(p.service.calls.get(), 1);
    assert!(p.saver.saved.borrow().is_empty());
    assert_eq!(*p.events.notices.borrow(), vec![Notice::ExportFailed]);
    assert_eq!(
        *p.events.states.borrow(),
        vec![ExportState::Pending, ExportState::Failed, ExportState::Idle]
    );
    assert_eq!(p.state(), ExportState::Idle);
}

#[tokio::test]
async fn reentrant_exports_issue_a_single_request() {
    let gate = Rc::new(Notify::new());
    let p = pipeline(FakeService::gated(Script::Ok(vec![7]), Rc::clone(&gate)));
    let source = loaded_source();
    let params = ParameterModel::default();

    let first = p.export(&source, &params);
    let second = async {
        tokio::task::yield_now().await;
        assert_eq!(p.state(), ExportState::Pending);
        let again = p.export(&source, &params).await;
        gate.notify_one();
        again
    };
    let (a, b) = tokio::join!(first, second);

    assert!(matches!(a, ExportOutcome::Saved(_)));
    assert_eq!(b, ExportOutcome::Ignored);
    assert_eq!(p.service.calls.get(), 1);
    assert_eq!(p.saver.saved.borrow().len(), 1);
    assert_eq!(p.state(), ExportState::Idle);
}

#[tokio::test]
async fn request_snapshot_ignores_later_edits() {
    let gate = Rc::new(Notify::new());
    let p = pipeline(FakeService::gated(Script::Ok(vec![1]), Rc::clone(&gate)));
    let source = loaded_source();
    let params = ParameterModel::default();

    let export = p.export(&source, &params);
    let edit = async {
        tokio::task::yield_now().await;
        params.set_width(DisplayWidth::Upper);
        gate.notify_one();
    };
    tokio::join!(export, edit);

    assert_eq!(p.service.last.borrow().as_ref().unwrap().width, 4416);
}

#[tokio::test]
async fn dropping_pending_export_rearms_control() {
    let gate = Rc::new(Notify::new());
    let p = pipeline(FakeService::gated(Script::Ok(vec![1]), gate));
    let source = loaded_source();
    let params = ParameterModel::default();

    {
        let fut = std::pin::pin!(p.export(&source, &params));
        let polled = poll_once(fut).await;
        assert!(polled.is_none());
        assert_eq!(p.state(), ExportState::Pending);
    }
    assert_eq!(p.state(), ExportState::Idle);
}

async fn poll_once<F: std::future::Future + Unpin>(fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        out = fut => Some(out),
        _ = std::future::ready(()) => None,
    }
}

#[test]
fn notices_read_like_user_messages() {
    assert!(Notice::MissingInput.to_string().contains("upload an image"));
    assert!(
        Notice::ServiceRejected { status: 404 }
            .to_string()
            .contains("404")
    );
}
