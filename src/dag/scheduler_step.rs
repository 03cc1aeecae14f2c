// src/dag/scheduler_step.rs

use crate::dag::task_info::ScheduledTask;
use crate::engine::TaskName;

/// Everything one trigger or completion changed in the active run.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStep {
    /// Ready tasks, already marked `Running`; hand them to the executor.
    pub newly_scheduled: Vec<ScheduledTask>,
    /// The failed task first, followed by the dependents it took down.
    pub newly_failed: Vec<TaskName>,
    /// This step left no task pending or running.
    pub run_just_finished: bool,
}
