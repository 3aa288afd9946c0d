#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use docflow_core::{
    ApiError, CancelReply, ControllerSettings, KeyValueStore, MemoryKvStore, Notifier,
    ProgressView, RawResponse, Scenario, StatusLookup, StatusReport, StepId, StoreError,
    TaskApi, TaskId, TaskSession, TaskStatus, ToastLevel, UploadController, UploadRequest,
    UploadResult, UploadUi,
};

#[derive(Debug, Clone)]
pub enum Tick {
    Found(StatusReport),
    NotFound,
    Fail,
}

pub fn report(status: TaskStatus) -> StatusReport {
    StatusReport::new(status)
}

/// Scripted server. Statuses are served in order, the last one repeating.
pub struct FakeApi {
    upload_reply: Mutex<Option<(Duration, Result<RawResponse, ApiError>)>>,
    ticks: Mutex<VecDeque<Tick>>,
    status_delay: Duration,
    scenario: Option<Scenario>,
    cancel_reply: CancelReply,
    cancelled: AtomicBool,
    pub upload_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub cancel_calls: AtomicUsize,
    pub last_upload: Mutex<Option<UploadRequest>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            upload_reply: Mutex::new(None),
            ticks: Mutex::new(VecDeque::from([Tick::Found(report(TaskStatus::Processing))])),
            status_delay: Duration::ZERO,
            scenario: None,
            cancel_reply: CancelReply {
                status: 200,
                success: true,
                message: Some("Task cancelled".to_string()),
            },
            cancelled: AtomicBool::new(false),
            upload_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            cancel_calls: AtomicUsize::new(0),
            last_upload: Mutex::new(None),
        }
    }

    pub fn upload_after(self, delay: Duration, reply: RawResponse) -> Self {
        *self.upload_reply.lock().unwrap() = Some((delay, Ok(reply)));
        self
    }

    pub fn upload_fails(self, err: ApiError) -> Self {
        self.upload_fails_after(Duration::ZERO, err)
    }

    pub fn upload_fails_after(self, delay: Duration, err: ApiError) -> Self {
        *self.upload_reply.lock().unwrap() = Some((delay, Err(err)));
        self
    }

    pub fn ticks(self, ticks: Vec<Tick>) -> Self {
        *self.ticks.lock().unwrap() = ticks.into();
        self
    }

    pub fn status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = delay;
        self
    }

    pub fn scenario(mut self, scenario: Scenario) -> Self {
        self.scenario = Some(scenario);
        self
    }

    pub fn reject_cancel(mut self, status: u16, message: &str) -> Self {
        self.cancel_reply = CancelReply {
            status,
            success: false,
            message: Some(message.to_string()),
        };
        self
    }
}

fn unreachable_error(path: &str) -> ApiError {
    ApiError::Connect {
        url: format!("http://127.0.0.1:1{path}"),
        message: "connection refused".to_string(),
    }
}

#[async_trait]
impl TaskApi for FakeApi {
    async fn upload(&self, request: UploadRequest) -> Result<RawResponse, ApiError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_upload.lock().unwrap() = Some(request);
        let reply = self.upload_reply.lock().unwrap().take();
        match reply {
            Some((delay, reply)) => {
                tokio::time::sleep(delay).await;
                reply
            }
            // Blocks like a server that never answers.
            None => {
                tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
                Err(unreachable_error("/upload"))
            }
        }
    }

    async fn get_status(&self, _task_id: &TaskId) -> Result<StatusLookup, ApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.status_delay).await;
        if self.cancelled.load(Ordering::SeqCst) {
            return Ok(StatusLookup::Found(
                report(TaskStatus::Cancelled).with_message("Task cancelled by user"),
            ));
        }
        let tick = {
            let mut ticks = self.ticks.lock().unwrap();
            if ticks.len() > 1 {
                ticks.pop_front()
            } else {
                ticks.front().cloned()
            }
        };
        match tick {
            Some(Tick::Found(report)) => Ok(StatusLookup::Found(report)),
            Some(Tick::NotFound) | None => Ok(StatusLookup::NotFound),
            Some(Tick::Fail) => Err(unreachable_error("/api/status")),
        }
    }

    async fn cancel(&self, _task_id: &TaskId) -> Result<CancelReply, ApiError> {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        if self.cancel_reply.accepted() {
            self.cancelled.store(true, Ordering::SeqCst);
        }
        Ok(self.cancel_reply.clone())
    }

    async fn fetch_scenario(&self, scenario_id: &str) -> Result<Scenario, ApiError> {
        self.scenario.clone().ok_or_else(|| ApiError::Status {
            status: 404,
            url: format!("http://127.0.0.1:5000/api/scenarios/{scenario_id}"),
            body: "Scenario not found".to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Busy(bool),
    CancelVisible(bool),
    Progress { visible: Vec<StepId>, percent: f64 },
    Status(TaskStatus),
    Result(UploadResult),
    Error(String),
}

#[derive(Default)]
pub struct RecordingUi {
    events: Mutex<Vec<UiEvent>>,
    last_view: Mutex<Option<ProgressView>>,
}

impl RecordingUi {
    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn results(&self) -> Vec<UploadResult> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Result(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Error(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn visible_history(&self) -> Vec<Vec<StepId>> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Progress { visible, .. } => Some(visible),
                _ => None,
            })
            .collect()
    }

    pub fn last_view(&self) -> Option<ProgressView> {
        self.last_view.lock().unwrap().clone()
    }

    fn push(&self, event: UiEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl UploadUi for RecordingUi {
    fn set_busy(&self, busy: bool) {
        self.push(UiEvent::Busy(busy));
    }

    fn set_cancel_visible(&self, visible: bool) {
        self.push(UiEvent::CancelVisible(visible));
    }

    fn render_progress(&self, view: &ProgressView) {
        *self.last_view.lock().unwrap() = Some(view.clone());
        self.push(UiEvent::Progress {
            visible: view.visible_steps(),
            percent: view.percent(),
        });
    }

    fn render_status(&self, report: &StatusReport) {
        self.push(UiEvent::Status(report.status));
    }

    fn render_result(&self, result: &UploadResult) {
        self.push(UiEvent::Result(result.clone()));
    }

    fn render_error(&self, message: &str) {
        self.push(UiEvent::Error(message.to_string()));
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub toasts: Mutex<Vec<(ToastLevel, String)>>,
}

impl RecordingNotifier {
    pub fn levels(&self) -> Vec<ToastLevel> {
        self.toasts.lock().unwrap().iter().map(|(l, _)| *l).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: ToastLevel, message: &str, _duration: Duration) {
        self.toasts.lock().unwrap().push((level, message.to_string()));
    }
}

/// Memory store that counts pair removals, i.e. teardowns.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryKvStore,
    pub removals: AtomicUsize,
}

impl CountingStore {
    pub fn removals(&self) -> usize {
        self.removals.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl KeyValueStore for CountingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        self.removals.fetch_add(1, Ordering::SeqCst);
        for key in keys {
            self.inner.remove(key)?;
        }
        Ok(())
    }
}

pub struct Harness {
    pub api: Arc<FakeApi>,
    pub store: Arc<CountingStore>,
    pub session: Arc<TaskSession>,
    pub ui: Arc<RecordingUi>,
    pub notifier: Arc<RecordingNotifier>,
    pub controller: Arc<UploadController>,
}

impl Harness {
    pub fn new(api: FakeApi) -> Self {
        Self::with_store(api, CountingStore::default())
    }

    pub fn with_store(api: FakeApi, store: CountingStore) -> Self {
        let api = Arc::new(api);
        let store = Arc::new(store);
        let session = Arc::new(TaskSession::new(store.clone(), api.clone()));
        let ui = Arc::new(RecordingUi::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let controller = Arc::new(UploadController::new(
            api.clone(),
            session.clone(),
            ui.clone(),
            notifier.clone(),
            ControllerSettings::default(),
        ));
        Self {
            api,
            store,
            session,
            ui,
            notifier,
            controller,
        }
    }
}

pub fn success_body(with_excel: bool) -> String {
    let excel = if with_excel {
        r#""excel_file": "task_spec_filled.xlsx", "excel_size": 4096,
           "excel_url": "/download_result/task_spec_filled.xlsx",
           "sheets": ["Tooling", "Services"]"#
    } else {
        r#""excel_file": null, "excel_size": 0, "excel_url": null, "sheets": []"#
    };
    format!(
        r#"{{"success": true, "message": "Document processed successfully",
            "results": {{"main": {{"json_file": "task_spec.json", "json_size": 2048,
            "json_url": "/download_result/task_spec.json", {excel}}}}}}}"#
    )
}
