//! Presentation seams consumed by the controller.

use std::time::Duration;

use crate::progress::ProgressView;
use crate::task::StatusReport;
use crate::upload::UploadResult;

/// Everything the upload flow renders. Implementations must not block.
pub trait UploadUi: Send + Sync {
    /// Disables (busy) or re-enables the submit affordance.
    fn set_busy(&self, busy: bool);

    fn set_cancel_visible(&self, visible: bool);

    fn render_progress(&self, view: &ProgressView);

    /// Latest server message and metrics, shown verbatim.
    fn render_status(&self, report: &StatusReport);

    fn render_result(&self, result: &UploadResult);

    fn render_error(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// Transient notifications. A zero duration means the toast stays until closed.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: ToastLevel, message: &str, duration: Duration);

    fn success(&self, message: &str, duration: Duration) {
        self.notify(ToastLevel::Success, message, duration);
    }

    fn error(&self, message: &str, duration: Duration) {
        self.notify(ToastLevel::Error, message, duration);
    }

    fn warning(&self, message: &str, duration: Duration) {
        self.notify(ToastLevel::Warning, message, duration);
    }

    fn info(&self, message: &str, duration: Duration) {
        self.notify(ToastLevel::Info, message, duration);
    }
}
