use std::path::Path;

use docflow_core::UploadFile;

use crate::app::AppContext;
use crate::commands::cli::UploadArgs;
use crate::error::CliError;
use crate::render::SkeletonKind;

use super::{ctrl_c_interrupts, exit_code, wait_with_cancel};

async fn read_file(path: &Path) -> Result<UploadFile, CliError> {
    UploadFile::read(path)
        .await
        .map_err(|e| CliError::Validation(format!("Cannot read {}: {e}", path.display())))
}

pub async fn run_upload(ctx: &AppContext, args: UploadArgs) -> Result<i32, CliError> {
    let file = match args.file.as_deref() {
        Some(path) => Some(read_file(path).await?),
        None => None,
    };

    // Validation failures must not touch the network, restore included.
    let previous = if file.is_some() {
        ctx.placeholders.show_skeleton("previous task", SkeletonKind::Line);
        let previous = ctx.session.restore().await;
        ctx.placeholders.hide_skeleton("previous task");
        previous
    } else {
        None
    };
    if let Some(task) = previous {
        // A new submission stops tracking it; the server keeps processing.
        ctx.notifier.show(
            docflow_core::ToastLevel::Info,
            &format!("Task {} from a previous run is still processing on the server", task.id),
            ctx.cfg.notify.duration(),
        );
    }

    let scenario = args
        .scenario
        .unwrap_or_else(|| ctx.cfg.upload.default_scenario.clone());
    let provider = args
        .provider
        .unwrap_or_else(|| ctx.cfg.upload.default_provider.clone());

    let controller = ctx.controller();
    let waited = wait_with_cancel(
        &controller,
        controller.submit(file, &scenario, &provider),
        ctrl_c_interrupts(),
    )
    .await;

    Ok(exit_code(waited))
}
