//! Lifecycle of the task this client is currently tracking.
//!
//! The persisted pair (`currentTaskId`, `taskStartTime`) exists only while a
//! non-terminal task is believed to be in flight. Both keys are always
//! written and removed together.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;

use super::id_gen::generate_task_id;
use super::types::{PersistedTask, TaskId};
use crate::api::{StatusLookup, TaskApi};
use crate::error::{CancelError, StoreError};
use crate::storage::KeyValueStore;

pub const CURRENT_TASK_KEY: &str = "currentTaskId";
pub const TASK_START_KEY: &str = "taskStartTime";

pub struct TaskSession {
    store: Arc<dyn KeyValueStore>,
    api: Arc<dyn TaskApi>,
    current: Mutex<Option<PersistedTask>>,
}

impl TaskSession {
    pub fn new(store: Arc<dyn KeyValueStore>, api: Arc<dyn TaskApi>) -> Self {
        Self {
            store,
            api,
            current: Mutex::new(None),
        }
    }

    pub fn current(&self) -> Option<PersistedTask> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_current(&self, task: Option<PersistedTask>) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = task;
    }

    /// Starts tracking a fresh task and persists it.
    ///
    /// Persistence is best-effort: a storage failure is logged and the task
    /// still becomes current.
    pub fn begin(&self) -> TaskId {
        let task = PersistedTask::started_now(generate_task_id());
        let start = task.start_time_ms.to_string();
        if let Err(e) = self.store.set_many(&[
            (CURRENT_TASK_KEY, task.id.as_str()),
            (TASK_START_KEY, start.as_str()),
        ]) {
            tracing::warn!(
                target: "docflow.session",
                stage = "session.begin.persist",
                task_id = %task.id,
                error = %e,
                "failed to persist task; it will not survive a restart"
            );
        }
        tracing::debug!(target: "docflow.session", stage = "session.begin", task_id = %task.id);
        let id = task.id.clone();
        self.set_current(Some(task));
        id
    }

    /// Reads the persisted task without contacting the server.
    pub fn persisted(&self) -> Result<Option<PersistedTask>, StoreError> {
        let Some(id) = self
            .store
            .get(CURRENT_TASK_KEY)?
            .filter(|id| !id.trim().is_empty())
        else {
            return Ok(None);
        };
        let start_time_ms = self
            .store
            .get(TASK_START_KEY)?
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or_else(|| Utc::now().timestamp_millis());
        Ok(Some(PersistedTask {
            id: TaskId::new(id),
            start_time_ms,
        }))
    }

    /// Rediscovers an in-flight task left by a previous run.
    ///
    /// Returns the task only when the server positively reports it as still
    /// running; every other answer (terminal, unknown, unreachable, garbled)
    /// discards the persisted state.
    pub async fn restore(&self) -> Option<PersistedTask> {
        let task = match self.persisted() {
            Ok(Some(task)) => task,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(target: "docflow.session", stage = "session.restore.read", error = %e);
                self.clear();
                return None;
            }
        };

        match self.api.get_status(&task.id).await {
            Ok(StatusLookup::Found(report)) if !report.status.is_terminal() => {
                tracing::info!(
                    target: "docflow.session",
                    stage = "session.restore.resume",
                    task_id = %task.id,
                    status = %report.status
                );
                self.set_current(Some(task.clone()));
                Some(task)
            }
            Ok(StatusLookup::Found(report)) => {
                tracing::debug!(
                    target: "docflow.session",
                    stage = "session.restore.terminal",
                    task_id = %task.id,
                    status = %report.status
                );
                self.clear();
                None
            }
            Ok(StatusLookup::NotFound) => {
                tracing::debug!(target: "docflow.session", stage = "session.restore.not_found", task_id = %task.id);
                self.clear();
                None
            }
            Err(e) => {
                tracing::warn!(
                    target: "docflow.session",
                    stage = "session.restore.error",
                    task_id = %task.id,
                    error = %e,
                    "discarding persisted task"
                );
                self.clear();
                None
            }
        }
    }

    /// Asks the server to cancel the current task.
    ///
    /// Local state is only cleared once the server confirms; on failure it
    /// is left intact so the caller may retry.
    pub async fn cancel(&self) -> Result<(), CancelError> {
        let task = self.current().ok_or(CancelError::NoCurrentTask)?;
        let reply = self.api.cancel(&task.id).await?;
        if !reply.accepted() {
            tracing::warn!(
                target: "docflow.session",
                stage = "session.cancel.rejected",
                task_id = %task.id,
                status = reply.status
            );
            return Err(CancelError::Rejected {
                status: reply.status,
                message: reply
                    .message
                    .unwrap_or_else(|| "Task not found or already finished".to_string()),
            });
        }
        tracing::info!(target: "docflow.session", stage = "session.cancel.accepted", task_id = %task.id);
        self.clear();
        Ok(())
    }

    /// Forgets the current task and its persisted state. Idempotent.
    pub fn clear(&self) {
        self.set_current(None);
        if let Err(e) = self.store.remove_many(&[CURRENT_TASK_KEY, TASK_START_KEY]) {
            tracing::warn!(target: "docflow.session", stage = "session.clear", error = %e);
        }
    }

    /// Makes a restored task current without touching storage.
    pub fn adopt(&self, task: PersistedTask) {
        self.set_current(Some(task));
    }
}
