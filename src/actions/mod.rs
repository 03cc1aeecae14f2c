// src/actions/mod.rs

//! What each task action actually does.
//!
//! - [`site`] runs the external generator.
//! - [`admin`] copies the admin panel with the repository substituted.
//! - [`sprite`] builds the icon sprite and injects it into a partial.
//! - [`command`] runs an arbitrary shell command.
//!
//! [`execute`] picks the right one for a scheduled task.

pub mod admin;
pub mod command;
pub mod site;
pub mod sprite;

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::dag::ScheduledTask;
use crate::engine::TaskOutcome;
use crate::exec::PipelineContext;
use crate::types::TaskAction;

/// Run the work behind `task` to completion.
///
/// Process actions report their exit status through the outcome; `Err` is
/// reserved for failures to do the work at all (spawn errors, I/O, bad
/// templates).
pub async fn execute(task: &ScheduledTask, ctx: &Arc<PipelineContext>) -> Result<TaskOutcome> {
    match task.action {
        TaskAction::Group | TaskAction::Serve => Ok(TaskOutcome::Success),

        TaskAction::Site => site::run_generator(&task.name, &ctx.site, &ctx.root, &task.args).await,

        TaskAction::Command => {
            let cmd = task
                .cmd
                .as_deref()
                .ok_or_else(|| anyhow!("task '{}' has no cmd", task.name))?;
            command::run_shell(&task.name, cmd, &ctx.root).await
        }

        TaskAction::Admin => {
            let ctx = Arc::clone(ctx);
            let written = tokio::task::spawn_blocking(move || {
                let source = ctx.root.join(&ctx.admin.source);
                let dest = ctx.root.join(&ctx.site.output).join(&ctx.admin.dest);
                admin::render_admin(
                    ctx.fs.as_ref(),
                    &source,
                    &dest,
                    &ctx.admin.placeholder,
                    ctx.repository.as_deref(),
                )
            })
            .await
            .context("admin task panicked")??;

            info!(task = %task.name, files = written, "admin panel written");
            Ok(TaskOutcome::Success)
        }

        TaskAction::Icons => {
            let ctx = Arc::clone(ctx);
            tokio::task::spawn_blocking(move || {
                sprite::update_icon_partial(ctx.fs.as_ref(), &ctx.root, &ctx.icons)
            })
            .await
            .context("icons task panicked")??;

            Ok(TaskOutcome::Success)
        }
    }
}
