//! Terminal rendition of the upload screen: a step line, a percentage bar,
//! the latest server message and the final result or error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crossterm::style::Stylize;
use docflow_core::task::Metrics;
use docflow_core::upload::format_size;
use docflow_core::{DisplayState, ProgressView, StatusReport, StepId, UploadResult, UploadUi};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::icons::get_icon;

pub struct TerminalUi {
    multi: MultiProgress,
    interactive: bool,
    base_url: String,
    steps: ProgressBar,
    bar: ProgressBar,
    attached: AtomicBool,
    cancel_hint: AtomicBool,
    last_steps: Mutex<String>,
}

fn step_glyph(state: DisplayState) -> &'static str {
    match state {
        DisplayState::Completed => "✔",
        DisplayState::Active => "●",
        DisplayState::Pending | DisplayState::Hidden => "○",
    }
}

/// `✔ Converting document › ● Technical characteristics`; hidden steps are left out.
pub fn format_steps(view: &ProgressView) -> String {
    view.steps()
        .filter(|(_, state)| *state != DisplayState::Hidden)
        .map(|(step, state)| format!("{} {}", step_glyph(state), step.label()))
        .collect::<Vec<_>>()
        .join(" › ")
}

pub fn format_metrics(metrics: &Metrics) -> String {
    metrics
        .iter()
        .map(|(k, v)| {
            if v.fract() == 0.0 {
                format!("{k}={}", *v as i64)
            } else {
                format!("{k}={v:.1}")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lines printed for a successful run; links are made absolute against `base_url`.
pub fn format_result(result: &UploadResult, base_url: &str) -> Vec<String> {
    let mut lines = vec![format!("{} {}", get_icon("check", ""), result.message)];
    let Some(main) = &result.main else {
        return lines;
    };
    lines.push(format!(
        "{} JSON  {} ({}) {}{}",
        get_icon("document", ""),
        main.json_file,
        format_size(main.json_size),
        base_url,
        main.json_url
    ));
    if let Some(excel) = main.excel() {
        lines.push(format!(
            "{} Excel {} ({}) {}{}",
            get_icon("chart", ""),
            excel.file,
            format_size(excel.size),
            base_url,
            excel.url
        ));
        if !excel.sheets.is_empty() {
            lines.push(format!("  sheets: {}", excel.sheets.join(", ")));
        }
    }
    if let Some(usage) = &main.usage {
        lines.push(format!(
            "  tokens: {} prompt + {} completion = {}",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        ));
    }
    lines
}

impl TerminalUi {
    pub fn new(multi: MultiProgress, interactive: bool, base_url: &str) -> Self {
        // Bars stay undrawn until a submission starts using them.
        let steps = ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden());
        steps.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✔"]),
        );
        let bar = ProgressBar::with_draw_target(Some(100), ProgressDrawTarget::hidden());
        bar.set_style(
            ProgressStyle::with_template("  [{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}% {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓▒░  "),
        );
        Self {
            multi,
            interactive,
            base_url: base_url.trim_end_matches('/').to_string(),
            steps,
            bar,
            attached: AtomicBool::new(false),
            cancel_hint: AtomicBool::new(false),
            last_steps: Mutex::new(String::new()),
        }
    }

    fn attach(&self) {
        if !self.attached.swap(true, Ordering::AcqRel) {
            self.multi.add(self.steps.clone());
            self.multi.add(self.bar.clone());
        }
    }

    fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    fn line(&self, text: String) {
        if self.interactive {
            let _ = self.multi.println(text);
        } else {
            println!("{text}");
        }
    }

    fn steps_message(&self, steps: &str) -> String {
        if self.cancel_hint.load(Ordering::Relaxed) {
            format!("{steps}  {}", "(Ctrl-C to cancel)".dim())
        } else {
            steps.to_string()
        }
    }
}

impl UploadUi for TerminalUi {
    fn set_busy(&self, busy: bool) {
        if busy {
            self.attach();
            self.bar.reset_elapsed();
            self.steps.enable_steady_tick(Duration::from_millis(100));
        } else {
            self.steps.disable_steady_tick();
            self.steps.tick();
        }
    }

    fn set_cancel_visible(&self, visible: bool) {
        self.cancel_hint.store(visible, Ordering::Relaxed);
        let current = self
            .last_steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        self.steps.set_message(self.steps_message(&current));
    }

    fn render_progress(&self, view: &ProgressView) {
        self.attach();
        let steps = format_steps(view);
        self.bar.set_position(view.percent().round() as u64);
        self.steps.set_message(self.steps_message(&steps));

        let changed = {
            let mut last = self.last_steps.lock().unwrap_or_else(PoisonError::into_inner);
            let changed = *last != steps;
            *last = steps.clone();
            changed
        };
        // Without a terminal the bars are hidden; log step changes as lines instead.
        if changed && !self.interactive {
            eprintln!("{steps} [{:.0}%]", view.percent());
        }
    }

    fn render_status(&self, report: &StatusReport) {
        let mut msg = report.message_text().unwrap_or_default().to_string();
        if !report.metrics.is_empty() {
            if !msg.is_empty() {
                msg.push_str(" | ");
            }
            msg.push_str(&format_metrics(&report.metrics));
        }
        self.bar.set_message(msg);
    }

    fn render_result(&self, result: &UploadResult) {
        if self.is_attached() {
            self.bar.finish();
            self.steps.finish();
        }
        for line in format_result(result, &self.base_url) {
            self.line(line);
        }
    }

    fn render_error(&self, message: &str) {
        if self.is_attached() {
            self.bar.abandon();
            self.steps.abandon();
        }
        self.line(format!("{} {}", get_icon("error", ""), message.red()));
    }
}
