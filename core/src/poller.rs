//! Repeating status fetch for one task.
//!
//! One loop per poller instance: `start` stops any previous loop first, and
//! `stop` is cooperative and idempotent. Transient failures never end the
//! loop; only a terminal status, an expired not-found grace period or
//! `stop` do.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::api::{StatusLookup, TaskApi};
use crate::task::{StatusReport, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub not_found_grace: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1_000),
            not_found_grace: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    Update(StatusReport),
    /// The server kept answering 404 past the grace period.
    Gone,
}

pub type PollCallback = Arc<dyn Fn(PollEvent) + Send + Sync>;

struct ActiveLoop {
    task_id: TaskId,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct StatusPoller {
    api: Arc<dyn TaskApi>,
    settings: PollSettings,
    active: Mutex<Option<ActiveLoop>>,
}

impl StatusPoller {
    pub fn new(api: Arc<dyn TaskApi>, settings: PollSettings) -> Self {
        Self {
            api,
            settings,
            active: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> PollSettings {
        self.settings
    }

    /// Fetches immediately, then every `interval`, reporting to `on_event`.
    ///
    /// `started_at` is when the task began; the not-found grace period is
    /// measured from it.
    pub fn start(&self, task_id: TaskId, started_at: Instant, on_event: PollCallback) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(prev) = active.take() {
            tracing::debug!(target: "docflow.poller", stage = "poller.replace", task_id = %prev.task_id);
            prev.token.cancel();
        }

        let token = CancellationToken::new();
        let handle = tokio::spawn(poll_loop(
            self.api.clone(),
            self.settings,
            task_id.clone(),
            started_at,
            token.clone(),
            on_event,
        ));
        tracing::debug!(target: "docflow.poller", stage = "poller.start", task_id = %task_id);
        *active = Some(ActiveLoop {
            task_id,
            token,
            handle,
        });
    }

    pub fn stop(&self) {
        let prev = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(prev) = prev {
            prev.token.cancel();
            tracing::debug!(target: "docflow.poller", stage = "poller.stop", task_id = %prev.task_id);
        }
    }

    pub fn is_running(&self) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|a| !a.token.is_cancelled() && !a.handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(
    api: Arc<dyn TaskApi>,
    settings: PollSettings,
    task_id: TaskId,
    started_at: Instant,
    token: CancellationToken,
    on_event: PollCallback,
) {
    loop {
        let lookup = tokio::select! {
            _ = token.cancelled() => break,
            r = api.get_status(&task_id) => r,
        };
        if token.is_cancelled() {
            break;
        }

        match lookup {
            Ok(StatusLookup::Found(report)) => {
                let terminal = report.status.is_terminal();
                tracing::debug!(
                    target: "docflow.poller",
                    stage = "poller.update",
                    task_id = %task_id,
                    status = %report.status,
                    progress = ?report.progress
                );
                on_event(PollEvent::Update(report));
                if terminal {
                    break;
                }
            }
            Ok(StatusLookup::NotFound) => {
                let elapsed = started_at.elapsed();
                if elapsed >= settings.not_found_grace {
                    tracing::info!(
                        target: "docflow.poller",
                        stage = "poller.gone",
                        task_id = %task_id,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "task unknown past grace period, likely already finished"
                    );
                    on_event(PollEvent::Gone);
                    break;
                }
                tracing::debug!(
                    target: "docflow.poller",
                    stage = "poller.not_found",
                    task_id = %task_id,
                    elapsed_ms = elapsed.as_millis() as u64
                );
            }
            Err(e) => {
                tracing::warn!(
                    target: "docflow.poller",
                    stage = "poller.error",
                    task_id = %task_id,
                    error = %e
                );
            }
        }

        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(settings.interval) => {}
        }
    }
}
