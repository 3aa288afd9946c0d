use docflow_core::{StatusLookup, StatusReport, TaskId};

use crate::app::AppContext;
use crate::error::CliError;
use crate::render::terminal_ui::format_metrics;
use crate::render::SkeletonKind;

pub fn format_report(report: &StatusReport) -> Vec<String> {
    let mut lines = vec![format!("status:   {}", report.status)];
    if let Some(stage) = report.stage.as_deref() {
        lines.push(format!("stage:    {stage}"));
    }
    if let Some(progress) = report.progress {
        lines.push(format!("progress: {progress:.0}%"));
    }
    if let Some(message) = report.message_text() {
        lines.push(format!("message:  {message}"));
    }
    if !report.metrics.is_empty() {
        lines.push(format!("metrics:  {}", format_metrics(&report.metrics)));
    }
    lines
}

pub async fn run_status(ctx: &AppContext, task_id: &str) -> Result<i32, CliError> {
    let id = TaskId::new(task_id.trim());
    ctx.placeholders.show_skeleton("status", SkeletonKind::Card);
    let lookup = ctx.api.get_status(&id).await;
    ctx.placeholders.hide_skeleton("status");

    match lookup? {
        StatusLookup::Found(report) => {
            for line in format_report(&report) {
                println!("{line}");
            }
            Ok(0)
        }
        StatusLookup::NotFound => Err(CliError::TaskNotFound(id.to_string())),
    }
}
