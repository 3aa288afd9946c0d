pub mod cancel;
pub mod resume;
pub mod status;
pub mod upload;

use std::future::Future;

use docflow_core::{UploadController, UploadError, UploadResult};
use tokio::sync::mpsc;

pub(crate) enum Waited {
    Settled(Result<UploadResult, UploadError>),
    /// The user left after the server accepted the cancel request.
    Detached,
}

/// Forwards every Ctrl-C into a channel; closed when the handler cannot be installed.
pub(crate) fn ctrl_c_interrupts() -> mpsc::Receiver<()> {
    let (tx, rx) = mpsc::channel(4);
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "cannot listen for Ctrl-C, cancel unavailable");
                break;
            }
            if tx.send(()).await.is_err() {
                break;
            }
        }
    });
    rx
}

/// Awaits `outcome`, turning an interrupt into a cancel request.
///
/// Cancellation is confirmed by the poller, so waiting continues until the
/// controller settles. Once a cancel request was accepted, the next
/// interrupt stops waiting; the stored task stays resumable.
pub(crate) async fn wait_with_cancel<F>(
    controller: &UploadController,
    outcome: F,
    mut interrupts: mpsc::Receiver<()>,
) -> Waited
where
    F: Future<Output = Result<UploadResult, UploadError>>,
{
    tokio::pin!(outcome);
    let mut cancel_accepted = false;
    loop {
        tokio::select! {
            biased;
            res = &mut outcome => return Waited::Settled(res),
            interrupt = interrupts.recv() => {
                if interrupt.is_none() {
                    return Waited::Settled(outcome.await);
                }
                if cancel_accepted {
                    tracing::info!("second interrupt, no longer waiting for the server");
                    return Waited::Detached;
                }
                tracing::info!("cancel requested from terminal");
                // Failures are reported by the controller's notifier.
                cancel_accepted = controller.cancel().await.is_ok();
            }
        }
    }
}

/// Exit code of a finished wait; a detached wait counts as a cancellation.
pub(crate) fn exit_code(waited: Waited) -> i32 {
    match waited {
        Waited::Settled(Ok(_)) => 0,
        Waited::Settled(Err(e)) => crate::error::upload_exit_code(&e),
        Waited::Detached => {
            eprintln!(
                "Stopped waiting. The server was asked to cancel; run `docflow resume` to follow it."
            );
            30
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use docflow_core::{
        ApiError, CancelReply, ControllerSettings, MemoryKvStore, RawResponse, Scenario,
        StatusLookup, StatusReport, TaskApi, TaskId, TaskSession, TaskStatus, UploadFile,
        UploadRequest,
    };
    use indicatif::{MultiProgress, ProgressDrawTarget};

    use crate::render::{TerminalUi, ToastNotifier};

    /// Server whose upload never answers; cancels are accepted or rejected.
    struct StuckServer {
        accept_cancel: bool,
        cancel_calls: AtomicUsize,
    }

    #[async_trait]
    impl TaskApi for StuckServer {
        async fn upload(&self, _request: UploadRequest) -> Result<RawResponse, ApiError> {
            std::future::pending().await
        }

        async fn get_status(&self, _task_id: &TaskId) -> Result<StatusLookup, ApiError> {
            // Two rejected cancels later the task gives up on its own.
            let status = if self.cancel_calls.load(Ordering::SeqCst) >= 2 {
                TaskStatus::Error
            } else {
                TaskStatus::Processing
            };
            Ok(StatusLookup::Found(StatusReport::new(status)))
        }

        async fn cancel(&self, _task_id: &TaskId) -> Result<CancelReply, ApiError> {
            self.cancel_calls.fetch_add(1, Ordering::SeqCst);
            Ok(CancelReply {
                status: if self.accept_cancel { 200 } else { 409 },
                success: self.accept_cancel,
                message: None,
            })
        }

        async fn fetch_scenario(&self, scenario_id: &str) -> Result<Scenario, ApiError> {
            Err(ApiError::Status {
                status: 404,
                url: format!("/api/scenarios/{scenario_id}"),
                body: String::new(),
            })
        }
    }

    fn controller(api: Arc<StuckServer>) -> UploadController {
        let session = Arc::new(TaskSession::new(
            Arc::new(MemoryKvStore::default()),
            api.clone(),
        ));
        let hidden = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        UploadController::new(
            api,
            session,
            Arc::new(TerminalUi::new(hidden, false, "http://127.0.0.1:5000")),
            Arc::new(ToastNotifier::new(false, None)),
            ControllerSettings::default(),
        )
    }

    fn file() -> Option<UploadFile> {
        Some(UploadFile::new("spec.pdf", b"%PDF-1.4".to_vec()))
    }

    #[tokio::test]
    async fn second_interrupt_after_accepted_cancel_detaches() {
        let api = Arc::new(StuckServer {
            accept_cancel: true,
            cancel_calls: AtomicUsize::new(0),
        });
        let controller = controller(api.clone());
        let (tx, rx) = mpsc::channel(4);
        tx.send(()).await.unwrap();
        tx.send(()).await.unwrap();

        let submit = controller.submit(file(), "default", "openai");
        let waited = wait_with_cancel(&controller, submit, rx).await;

        assert!(matches!(waited, Waited::Detached));
        assert_eq!(api.cancel_calls.load(Ordering::SeqCst), 1);
        assert!(controller.session().current().is_some());
        assert_eq!(exit_code(waited), 30);
    }

    #[tokio::test]
    async fn rejected_cancel_keeps_waiting() {
        let api = Arc::new(StuckServer {
            accept_cancel: false,
            cancel_calls: AtomicUsize::new(0),
        });
        let controller = controller(api.clone());
        let (tx, rx) = mpsc::channel(4);
        tx.send(()).await.unwrap();
        tx.send(()).await.unwrap();
        drop(tx);

        let submit = controller.submit(file(), "default", "openai");
        let waited = wait_with_cancel(&controller, submit, rx).await;

        assert!(matches!(
            waited,
            Waited::Settled(Err(UploadError::TaskFailed { .. }))
        ));
        assert_eq!(api.cancel_calls.load(Ordering::SeqCst), 2);
    }
}
