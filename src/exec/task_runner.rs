// src/exec/task_runner.rs

//! Running one scheduled task and reporting its outcome.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::actions;
use crate::dag::ScheduledTask;
use crate::engine::{RuntimeEvent, TaskOutcome};
use crate::exec::PipelineContext;
use crate::serve::ReloadMessage;

/// Run `task`, tell live-reload clients about the result and send
/// `TaskCompleted` to the runtime.
///
/// Errors from the action become `Failed(-1)` and are logged here; their
/// text is passed on to clients but they never stop the executor.
pub async fn run_task(
    task: ScheduledTask,
    ctx: Arc<PipelineContext>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    let (outcome, reason) = match actions::execute(&task, &ctx).await {
        Ok(outcome) => (outcome, None),
        Err(err) => {
            let reason = format!("{err:#}");
            error!(
                task = %task.name,
                run_id = task.run_id,
                error = %reason,
                "task execution error"
            );
            (TaskOutcome::Failed(-1), Some(reason))
        }
    };

    match outcome {
        TaskOutcome::Success => {
            info!(task = %task.name, run_id = task.run_id, "task finished");
        }
        TaskOutcome::Failed(code) => {
            warn!(task = %task.name, run_id = task.run_id, exit_code = code, "task failed");
        }
    }

    if let Some(msg) = notification_for(&task, outcome, reason.as_deref()) {
        ctx.hub.send(msg);
    }

    if let Err(err) = runtime_tx
        .send(RuntimeEvent::TaskCompleted {
            task: task.name.clone(),
            outcome,
        })
        .await
    {
        warn!(task = %task.name, "failed to report task completion: {err}");
    }
}

/// The live-reload message a finished task produces, if any.
///
/// `reason` is the error text when the action could not run to an exit
/// status; it replaces the exit code in the failure message.
pub fn notification_for(
    task: &ScheduledTask,
    outcome: TaskOutcome,
    reason: Option<&str>,
) -> Option<ReloadMessage> {
    match outcome {
        TaskOutcome::Success if task.action.reloads_clients() => Some(ReloadMessage::Reload),
        TaskOutcome::Success => None,
        TaskOutcome::Failed(_) if !task.action.reports_failures() => None,
        TaskOutcome::Failed(code) => {
            let message = match reason {
                Some(reason) => format!("{} build failed: {}", task.name, reason),
                None => format!("{} build failed (exit code {})", task.name, code),
            };
            Some(ReloadMessage::BuildFailed {
                task: task.name.clone(),
                message,
            })
        }
    }
}
