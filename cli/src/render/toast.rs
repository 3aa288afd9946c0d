//! Toast manager: short-lived notifications printed once and tracked until
//! they expire or are dismissed.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crossterm::style::Stylize;
use docflow_core::{Notifier, ToastLevel};
use indicatif::MultiProgress;

use super::icons::get_icon;

pub type ToastId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub level: ToastLevel,
    pub message: String,
    expires_at: Option<Instant>,
}

#[derive(Default)]
struct ToastState {
    next_id: ToastId,
    toasts: Vec<Toast>,
}

impl ToastState {
    fn sweep(&mut self, now: Instant) {
        self.toasts
            .retain(|t| t.expires_at.map(|at| at > now).unwrap_or(true));
    }
}

pub struct ToastNotifier {
    state: Mutex<ToastState>,
    print: bool,
    /// Present while progress bars own the terminal; lines go through it.
    output: Option<MultiProgress>,
}

fn title(level: ToastLevel) -> &'static str {
    match level {
        ToastLevel::Success => "Success",
        ToastLevel::Error => "Error",
        ToastLevel::Warning => "Warning",
        ToastLevel::Info => "Info",
    }
}

fn icon_name(level: ToastLevel) -> &'static str {
    match level {
        ToastLevel::Success => "check",
        ToastLevel::Error => "error",
        ToastLevel::Warning => "warning",
        ToastLevel::Info => "info",
    }
}

pub fn format_toast(level: ToastLevel, message: &str) -> String {
    let head = format!("{} {}", get_icon(icon_name(level), "bold"), title(level));
    let head = match level {
        ToastLevel::Success => head.green(),
        ToastLevel::Error => head.red(),
        ToastLevel::Warning => head.yellow(),
        ToastLevel::Info => head.cyan(),
    };
    format!("{head}: {message}")
}

impl ToastNotifier {
    pub fn new(print: bool, output: Option<MultiProgress>) -> Self {
        Self {
            state: Mutex::new(ToastState::default()),
            print,
            output,
        }
    }

    /// Tracks toasts without printing them.
    pub fn silent() -> Self {
        Self::new(false, None)
    }

    /// A zero duration keeps the toast until [`ToastNotifier::dismiss`].
    pub fn show(&self, level: ToastLevel, message: &str, duration: Duration) -> ToastId {
        self.show_at(level, message, duration, Instant::now())
    }

    fn show_at(
        &self,
        level: ToastLevel,
        message: &str,
        duration: Duration,
        now: Instant,
    ) -> ToastId {
        let id = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.sweep(now);
            state.next_id += 1;
            let id = state.next_id;
            state.toasts.push(Toast {
                id,
                level,
                message: message.to_string(),
                expires_at: (!duration.is_zero()).then(|| now + duration),
            });
            id
        };

        tracing::debug!(toast_id = id, level = level.as_str(), "toast shown");
        if self.print {
            let line = format_toast(level, message);
            match &self.output {
                Some(multi) => {
                    let _ = multi.println(line);
                }
                None => eprintln!("{line}"),
            }
        }
        id
    }

    /// Closes a toast early. Returns false if it was already gone.
    pub fn dismiss(&self, id: ToastId) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let before = state.toasts.len();
        state.toasts.retain(|t| t.id != id);
        state.toasts.len() != before
    }

    pub fn active(&self) -> Vec<Toast> {
        self.active_at(Instant::now())
    }

    fn active_at(&self, now: Instant) -> Vec<Toast> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.sweep(now);
        state.toasts.clone()
    }
}

impl Notifier for ToastNotifier {
    fn notify(&self, level: ToastLevel, message: &str, duration: Duration) {
        self.show(level, message, duration);
    }
}
