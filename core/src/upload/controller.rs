//! Submission orchestration: `Idle -> Submitting -> (Succeeded | Failed) -> Idle`.
//!
//! While submitting, two paths can resolve the task: the upload response
//! and the status poller. Both go through [`ControllerInner::finalize`],
//! and only the first one to claim the attempt renders. Teardown (poller
//! stop, stored pair removal) runs once, as soon as a terminal state is
//! known, even when the upload still owes the result payload.

use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use tokio::time::Instant;

use super::attempt::{Attempt, Outcome};
use super::file::UploadFile;
use super::result::{interpret_upload_response, UploadResult};
use crate::api::{TaskApi, UploadRequest};
use crate::config::AppConfig;
use crate::error::{CancelError, UploadError};
use crate::poller::{PollCallback, PollEvent, PollSettings, StatusPoller};
use crate::progress::ProgressView;
use crate::task::{PersistedTask, StatusReport, TaskSession, TaskStatus};
use crate::ui::{Notifier, UploadUi};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy)]
pub struct ControllerSettings {
    pub poll: PollSettings,
    pub max_file_bytes: u64,
    pub toast_duration: Duration,
    /// How long the upload response may lag behind a polled `completed`.
    pub result_wait: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl ControllerSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            poll: config.polling.settings(),
            max_file_bytes: config.upload.max_file_bytes,
            toast_duration: config.notify.duration(),
            result_wait: config.upload.result_wait(),
        }
    }
}

struct ControllerInner {
    api: Arc<dyn TaskApi>,
    session: Arc<TaskSession>,
    poller: StatusPoller,
    progress: Mutex<ProgressView>,
    ui: Arc<dyn UploadUi>,
    notifier: Arc<dyn Notifier>,
    phase: Mutex<ControllerPhase>,
    attempt: Mutex<Option<Arc<Attempt>>>,
    settings: ControllerSettings,
}

pub struct UploadController {
    inner: Arc<ControllerInner>,
}

impl UploadController {
    pub fn new(
        api: Arc<dyn TaskApi>,
        session: Arc<TaskSession>,
        ui: Arc<dyn UploadUi>,
        notifier: Arc<dyn Notifier>,
        settings: ControllerSettings,
    ) -> Self {
        let poller = StatusPoller::new(api.clone(), settings.poll);
        Self {
            inner: Arc::new(ControllerInner {
                api,
                session,
                poller,
                progress: Mutex::new(ProgressView::new()),
                ui,
                notifier,
                phase: Mutex::new(ControllerPhase::Idle),
                attempt: Mutex::new(None),
                settings,
            }),
        }
    }

    pub fn phase(&self) -> ControllerPhase {
        *self.inner.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn session(&self) -> &Arc<TaskSession> {
        &self.inner.session
    }

    /// Snapshot of the progress model as last rendered.
    pub fn progress(&self) -> ProgressView {
        self.inner
            .progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Submits `file` and waits until the task resolves one way or the other.
    ///
    /// A missing file fails immediately without any network call.
    pub async fn submit(
        &self,
        file: Option<UploadFile>,
        scenario_id: &str,
        provider: &str,
    ) -> Result<UploadResult, UploadError> {
        let inner = &self.inner;
        let Some(file) = file else {
            let err = UploadError::no_file();
            inner.ui.render_error(&err.user_message());
            inner
                .notifier
                .error(&err.user_message(), inner.settings.toast_duration);
            return Err(err);
        };
        inner.enter_submitting()?;

        inner.ui.set_busy(true);
        inner.with_progress(|view| {
            view.reset();
            view.set_progress_bar(0.0);
        });

        let task_id = inner.session.begin();
        tracing::info!(
            target: "docflow.upload",
            stage = "upload.submit",
            task_id = %task_id,
            file = %file.file_name,
            bytes = file.len(),
            scenario = scenario_id,
            provider = provider
        );

        let (attempt, rx) = Attempt::new(task_id.clone(), true);
        inner.track(&attempt);
        inner.ui.set_cancel_visible(true);
        inner.start_polling(&attempt, Instant::now());
        inner.spawn_scenario_refresh(&attempt, scenario_id.to_string());

        let request = UploadRequest {
            file,
            task_id,
            scenario_id: scenario_id.to_string(),
            provider: provider.to_string(),
        };
        let upload_inner = inner.clone();
        let upload_attempt = attempt.clone();
        // Not aborted on cancel: the server is asked to stop and the poller observes it.
        tokio::spawn(async move {
            let outcome = match upload_inner.api.upload(request).await {
                Ok(raw) => {
                    tracing::debug!(
                        target: "docflow.upload",
                        stage = "upload.response",
                        task_id = %upload_attempt.task_id,
                        status = raw.status
                    );
                    interpret_upload_response(&raw, upload_inner.settings.max_file_bytes)
                }
                Err(e) => {
                    tracing::warn!(
                        target: "docflow.upload",
                        stage = "upload.transport",
                        task_id = %upload_attempt.task_id,
                        error = %e
                    );
                    Err(UploadError::from_transport(&e))
                }
            };
            let outcome = upload_attempt.reconcile(outcome);
            upload_inner.finalize(&upload_attempt, outcome);
        });

        inner.await_outcome(rx).await
    }

    /// Resumes rendering and polling for a task restored after restart.
    ///
    /// Only the poller can resolve it; `completed` yields a result without payload.
    pub async fn resume(&self, task: PersistedTask) -> Result<UploadResult, UploadError> {
        let inner = &self.inner;
        inner.enter_submitting()?;

        // The scenario of a restored task is unknown.
        inner.ui.set_busy(true);
        inner.with_progress(|view| {
            view.reset();
            view.show_all();
        });

        let started_at = Instant::now()
            .checked_sub(task.elapsed())
            .unwrap_or_else(Instant::now);
        tracing::info!(
            target: "docflow.upload",
            stage = "upload.resume",
            task_id = %task.id,
            elapsed_ms = task.elapsed().as_millis() as u64
        );
        let (attempt, rx) = Attempt::new(task.id.clone(), false);
        inner.session.adopt(task);
        inner.track(&attempt);
        inner.ui.set_cancel_visible(true);
        inner.start_polling(&attempt, started_at);

        inner.await_outcome(rx).await
    }

    /// Asks the server to cancel the current task.
    ///
    /// Success only means the request was accepted; teardown happens when
    /// the poller observes `cancelled`.
    pub async fn cancel(&self) -> Result<(), CancelError> {
        let inner = &self.inner;
        match inner.session.cancel().await {
            Ok(()) => {
                inner.notifier.info(
                    "Cancellation requested, waiting for the server to stop",
                    inner.settings.toast_duration,
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(target: "docflow.upload", stage = "upload.cancel", error = %e);
                inner.notifier.warning(
                    &format!("Cancellation did not take effect: {e}"),
                    inner.settings.toast_duration,
                );
                Err(e)
            }
        }
    }
}

impl ControllerInner {
    fn set_phase(&self, phase: ControllerPhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
    }

    fn enter_submitting(&self) -> Result<(), UploadError> {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        if *phase == ControllerPhase::Submitting {
            return Err(UploadError::Busy);
        }
        *phase = ControllerPhase::Submitting;
        Ok(())
    }

    fn with_progress(&self, f: impl FnOnce(&mut ProgressView)) {
        let mut view = self.progress.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut view);
        self.ui.render_progress(&view);
    }

    /// Applies `f` and renders, unless the attempt settled meanwhile.
    ///
    /// `finalize` claims under the same lock, so nothing stale is drawn after
    /// the result or the error.
    fn with_live_progress(
        &self,
        attempt: &Attempt,
        f: impl FnOnce(&mut ProgressView),
    ) -> bool {
        let mut view = self.progress.lock().unwrap_or_else(PoisonError::into_inner);
        if attempt.is_settled() {
            return false;
        }
        f(&mut view);
        self.ui.render_progress(&view);
        true
    }

    fn track(&self, attempt: &Arc<Attempt>) {
        *self.attempt.lock().unwrap_or_else(PoisonError::into_inner) = Some(attempt.clone());
    }

    fn untrack(&self, attempt: &Arc<Attempt>) {
        let mut current = self.attempt.lock().unwrap_or_else(PoisonError::into_inner);
        if current.as_ref().is_some_and(|a| Arc::ptr_eq(a, attempt)) {
            *current = None;
        }
    }

    async fn await_outcome(
        &self,
        rx: tokio::sync::oneshot::Receiver<Outcome>,
    ) -> Result<UploadResult, UploadError> {
        let outcome = rx.await.unwrap_or_else(|_| {
            Err(UploadError::TaskFailed {
                message: "Processing was interrupted".to_string(),
            })
        });
        self.set_phase(ControllerPhase::Idle);
        outcome
    }

    fn start_polling(self: &Arc<Self>, attempt: &Arc<Attempt>, started_at: Instant) {
        let weak: Weak<Self> = Arc::downgrade(self);
        let cb_attempt = attempt.clone();
        let callback: PollCallback = Arc::new(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.on_poll_event(&cb_attempt, event);
            }
        });
        self.poller
            .start(attempt.task_id.clone(), started_at, callback);
    }

    fn spawn_scenario_refresh(self: &Arc<Self>, attempt: &Arc<Attempt>, scenario_id: String) {
        let inner = self.clone();
        let attempt = attempt.clone();
        tokio::spawn(async move {
            let fetched = inner.api.fetch_scenario(&scenario_id).await;
            match fetched {
                Ok(scenario) => {
                    let visible = scenario.visible_steps();
                    tracing::debug!(
                        target: "docflow.upload",
                        stage = "upload.scenario",
                        scenario = %scenario_id,
                        visible = ?visible
                    );
                    inner.with_live_progress(&attempt, |view| view.configure(&visible));
                }
                Err(e) => {
                    tracing::warn!(
                        target: "docflow.upload",
                        stage = "upload.scenario",
                        scenario = %scenario_id,
                        error = %e,
                        "scenario unavailable, showing every step"
                    );
                    inner.with_live_progress(&attempt, |view| view.show_all());
                }
            }
        });
    }

    fn on_poll_event(self: &Arc<Self>, attempt: &Arc<Attempt>, event: PollEvent) {
        match event {
            PollEvent::Update(report) => {
                let live = {
                    let mut view = self.progress.lock().unwrap_or_else(PoisonError::into_inner);
                    if attempt.is_settled() {
                        false
                    } else {
                        if let Some(stage) = report.stage.as_deref() {
                            view.apply_stage(stage);
                        }
                        if let Some(progress) = report.progress {
                            view.set_progress_bar(progress);
                        }
                        self.ui.render_progress(&view);
                        self.ui.render_status(&report);
                        true
                    }
                };
                if live {
                    self.on_status(attempt, &report);
                }
            }
            PollEvent::Gone => {
                if attempt.is_settled() {
                    return;
                }
                self.teardown(attempt);
                if !attempt.upload_in_flight {
                    self.finalize(
                        attempt,
                        Err(UploadError::TaskNotFound {
                            task_id: attempt.task_id.to_string(),
                        }),
                    );
                }
            }
        }
    }

    fn on_status(self: &Arc<Self>, attempt: &Arc<Attempt>, report: &StatusReport) {
        match report.status {
            TaskStatus::Completed if attempt.upload_in_flight => {
                let message = report
                    .message_text()
                    .unwrap_or("Document processed successfully")
                    .to_string();
                attempt.mark_completed(message.clone());
                self.teardown(attempt);
                self.with_live_progress(attempt, |view| {
                    view.complete_all();
                    view.set_progress_bar(100.0);
                });
                self.await_upload_payload(attempt, message);
            }
            TaskStatus::Completed => {
                let message = report
                    .message_text()
                    .unwrap_or("Document processed successfully")
                    .to_string();
                self.finalize(attempt, Ok(UploadResult { message, main: None }));
            }
            TaskStatus::Cancelled => {
                let message = report
                    .message_text()
                    .unwrap_or("Processing was cancelled")
                    .to_string();
                self.finalize(attempt, Err(UploadError::Cancelled { message }));
            }
            TaskStatus::Error => {
                let message = report
                    .message_text()
                    .unwrap_or("An error occurred during processing")
                    .to_string();
                self.finalize(attempt, Err(UploadError::TaskFailed { message }));
            }
            _ => {}
        }
    }

    /// Gives the upload response `result_wait` to deliver the payload, then
    /// settles the completed task without it.
    fn await_upload_payload(self: &Arc<Self>, attempt: &Arc<Attempt>, message: String) {
        let inner = self.clone();
        let attempt = attempt.clone();
        let wait = self.settings.result_wait;
        tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            if attempt.is_settled() {
                return;
            }
            tracing::info!(
                target: "docflow.upload",
                stage = "upload.result_wait",
                task_id = %attempt.task_id,
                wait_ms = wait.as_millis() as u64,
                "no upload response after completion, settling without payload"
            );
            inner.finalize(&attempt, Ok(UploadResult { message, main: None }));
        });
    }

    /// Stops polling and forgets the stored pair; runs once per attempt.
    fn teardown(&self, attempt: &Attempt) {
        if !attempt.begin_teardown() {
            return;
        }
        self.poller.stop();
        self.session.clear();
        self.ui.set_cancel_visible(false);
    }

    fn finalize(&self, attempt: &Arc<Attempt>, outcome: Outcome) {
        let claimed = {
            let _view = self.progress.lock().unwrap_or_else(PoisonError::into_inner);
            attempt.claim()
        };
        if !claimed {
            tracing::debug!(
                target: "docflow.upload",
                stage = "upload.finalize.skip",
                task_id = %attempt.task_id,
                ok = outcome.is_ok()
            );
            return;
        }

        self.teardown(attempt);

        let duration = self.settings.toast_duration;
        match &outcome {
            Ok(result) => {
                self.with_progress(|view| {
                    view.complete_all();
                    view.set_progress_bar(100.0);
                });
                self.ui.render_result(result);
                self.notifier.success(&result.message, duration);
                self.set_phase(ControllerPhase::Succeeded);
                tracing::info!(
                    target: "docflow.upload",
                    stage = "upload.succeeded",
                    task_id = %attempt.task_id
                );
            }
            Err(e) => {
                let message = e.user_message();
                self.ui.render_error(&message);
                if matches!(e, UploadError::Cancelled { .. }) {
                    self.notifier.warning(&message, duration);
                } else {
                    self.notifier.error(&message, duration);
                }
                self.set_phase(ControllerPhase::Failed);
                tracing::info!(
                    target: "docflow.upload",
                    stage = "upload.failed",
                    task_id = %attempt.task_id,
                    error = %e
                );
            }
        }

        self.ui.set_busy(false);
        self.untrack(attempt);
        attempt.deliver(outcome);
    }
}
