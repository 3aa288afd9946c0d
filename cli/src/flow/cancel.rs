use docflow_core::ToastLevel;

use crate::app::AppContext;
use crate::error::CliError;

pub async fn run_cancel(ctx: &AppContext) -> Result<i32, CliError> {
    let Some(task) = ctx.session.restore().await else {
        println!("No task in progress.");
        return Ok(0);
    };

    ctx.session.cancel().await?;
    ctx.notifier.show(
        ToastLevel::Success,
        &format!("Cancellation of {} accepted", task.id),
        ctx.cfg.notify.duration(),
    );
    Ok(0)
}
