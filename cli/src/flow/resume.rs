use crate::app::AppContext;
use crate::error::CliError;
use crate::render::SkeletonKind;

use super::{ctrl_c_interrupts, exit_code, wait_with_cancel};

pub async fn run_resume(ctx: &AppContext) -> Result<i32, CliError> {
    ctx.placeholders.show_skeleton("previous task", SkeletonKind::Line);
    let restored = ctx.session.restore().await;
    ctx.placeholders.hide_skeleton("previous task");

    let Some(task) = restored else {
        println!("No task in progress.");
        return Ok(0);
    };
    println!("Resuming {}", task.id);

    let controller = ctx.controller();
    let waited =
        wait_with_cancel(&controller, controller.resume(task), ctrl_c_interrupts()).await;
    Ok(exit_code(waited))
}
