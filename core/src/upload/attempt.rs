use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;

use crate::error::UploadError;
use crate::task::TaskId;
use crate::upload::UploadResult;

pub(crate) type Outcome = Result<UploadResult, UploadError>;

/// One tracked task as seen by the controller, settled at most once.
///
/// The upload path and the poller path race to settle it; the loser finds
/// it already settled and does nothing.
pub(crate) struct Attempt {
    pub task_id: TaskId,
    /// False for a task resumed after restart: nothing but the poller can resolve it.
    pub upload_in_flight: bool,
    settled: AtomicBool,
    torn_down: AtomicBool,
    /// Message of a `completed` status seen before the upload answered.
    completed: Mutex<Option<String>>,
    tx: Mutex<Option<oneshot::Sender<Outcome>>>,
}

impl Attempt {
    pub fn new(task_id: TaskId, upload_in_flight: bool) -> (Arc<Self>, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        let attempt = Arc::new(Self {
            task_id,
            upload_in_flight,
            settled: AtomicBool::new(false),
            torn_down: AtomicBool::new(false),
            completed: Mutex::new(None),
            tx: Mutex::new(Some(tx)),
        });
        (attempt, rx)
    }

    /// Returns true exactly once, for the first caller.
    pub fn claim(&self) -> bool {
        !self.settled.swap(true, Ordering::AcqRel)
    }

    pub fn is_settled(&self) -> bool {
        self.settled.load(Ordering::Acquire)
    }

    /// Returns true exactly once; poller and stored pair are released by that caller.
    pub fn begin_teardown(&self) -> bool {
        !self.torn_down.swap(true, Ordering::AcqRel)
    }

    pub fn mark_completed(&self, message: String) {
        *self.completed.lock().unwrap_or_else(PoisonError::into_inner) = Some(message);
    }

    pub fn completed_message(&self) -> Option<String> {
        self.completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The server already reported `completed`: a failed upload response
    /// still ends as a success, without payload.
    pub fn reconcile(&self, outcome: Outcome) -> Outcome {
        match (outcome, self.completed_message()) {
            (Err(e), Some(message)) => {
                tracing::warn!(
                    target: "docflow.upload",
                    stage = "upload.reconcile",
                    task_id = %self.task_id,
                    error = %e,
                    "upload response failed after the task completed"
                );
                Ok(UploadResult { message, main: None })
            }
            (outcome, _) => outcome,
        }
    }

    pub fn deliver(&self, outcome: Outcome) {
        let tx = self.tx.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(tx) = tx {
            let _ = tx.send(outcome);
        }
    }
}
