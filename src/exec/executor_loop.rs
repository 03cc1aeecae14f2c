// src/exec/executor_loop.rs

//! Background loop that turns scheduled tasks into running tokio tasks.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::dag::ScheduledTask;
use crate::engine::RuntimeEvent;
use crate::exec::task_runner::run_task;
use crate::exec::PipelineContext;

/// Spawn the executor loop and return the sender that feeds it.
///
/// Every scheduled task runs in its own tokio task, so independent tasks run
/// in parallel. The scheduler never dispatches a task twice within a run,
/// so no per-name bookkeeping is needed here.
pub fn spawn_executor(
    ctx: Arc<PipelineContext>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> mpsc::Sender<ScheduledTask> {
    let (tx, mut rx) = mpsc::channel::<ScheduledTask>(32);

    tokio::spawn(async move {
        debug!("executor loop started");

        while let Some(task) = rx.recv().await {
            debug!(task = %task.name, run_id = task.run_id, "executor received task");
            tokio::spawn(run_task(task, Arc::clone(&ctx), runtime_tx.clone()));
        }

        debug!("executor loop finished (channel closed)");
    });

    tx
}
