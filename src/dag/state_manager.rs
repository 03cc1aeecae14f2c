// src/dag/state_manager.rs

//! Per-run state management for tasks in the scheduler.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info, warn};

use crate::dag::task_info::{RunState, ScheduledTask, TaskInfo};
use crate::dag::DagGraph;
use crate::engine::TaskName;

/// Manages per-run state transitions for tasks.
pub struct StateManager<'a> {
    graph: &'a DagGraph,
    tasks: &'a mut BTreeMap<TaskName, TaskInfo>,
    current_run_id: Option<u64>,
}

impl<'a> StateManager<'a> {
    pub fn new(
        graph: &'a DagGraph,
        tasks: &'a mut BTreeMap<TaskName, TaskInfo>,
        current_run_id: Option<u64>,
    ) -> Self {
        Self {
            graph,
            tasks,
            current_run_id,
        }
    }

    /// Include a requested task and everything it depends on in this run.
    ///
    /// - Tasks that were not yet part of the run (`run_state == None`) are
    ///   marked `Pending`.
    /// - Tasks already participating in this run keep their current state.
    pub fn mark_task_and_dependencies_pending(&mut self, root: &str) {
        let mut stack: Vec<TaskName> = vec![root.to_string()];
        let mut visited: HashSet<TaskName> = HashSet::new();

        while let Some(name) = stack.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }

            if let Some(info) = self.tasks.get_mut(&name) {
                if info.run_state.is_none() {
                    info.run_state = Some(RunState::Pending);
                    debug!(task = %info.name, "marked Pending for this run");
                }

                stack.extend(self.graph.dependencies_of(&name).iter().cloned());
            } else {
                warn!(task = %name, "node in task graph not present in tasks map");
            }
        }

        self.fail_blocked_tasks();
    }

    /// Mark `Pending` tasks whose dependency already failed in this run as
    /// failed, until nothing changes.
    ///
    /// Needed when a task joins a run after one of its dependencies failed;
    /// otherwise it would wait forever.
    fn fail_blocked_tasks(&mut self) {
        loop {
            let tasks = &*self.tasks;
            let blocked: Vec<TaskName> = tasks
                .values()
                .filter(|info| matches!(info.run_state, Some(RunState::Pending)))
                .filter(|info| {
                    info.deps.iter().any(|d| {
                        tasks
                            .get(d)
                            .is_some_and(|dep| dep.run_state == Some(RunState::DoneFailed))
                    })
                })
                .map(|info| info.name.clone())
                .collect();

            if blocked.is_empty() {
                return;
            }

            for name in blocked {
                if let Some(info) = self.tasks.get_mut(&name) {
                    debug!(task = %info.name, "dependency already failed in this run");
                    info.run_state = Some(RunState::DoneFailed);
                }
            }
        }
    }

    /// Mark all pending/running dependents (transitively) of a failed task as
    /// `DoneFailed` for this run.
    ///
    /// Returns the tasks newly marked as failed, excluding `failed_task`.
    pub fn mark_dependents_failed(&mut self, failed_task: &str) -> Vec<TaskName> {
        let mut stack: Vec<TaskName> = self.graph.dependents_of(failed_task).to_vec();
        let mut newly_failed = Vec::new();

        while let Some(name) = stack.pop() {
            if let Some(info) = self.tasks.get_mut(&name) {
                match info.run_state {
                    Some(RunState::Pending) | Some(RunState::Running) => {
                        info.run_state = Some(RunState::DoneFailed);
                        debug!(
                            task = %info.name,
                            "marking dependent as DoneFailed due to upstream failure"
                        );
                        newly_failed.push(info.name.clone());
                        stack.extend(self.graph.dependents_of(&name).iter().cloned());
                    }
                    Some(RunState::DoneSuccess) | Some(RunState::DoneFailed) | None => {}
                }
            }
        }

        newly_failed
    }

    /// Collect tasks that are `Pending` and whose dependencies are satisfied,
    /// mark them as `Running`, and return them as `ScheduledTask`s.
    pub fn collect_new_ready_tasks(&mut self) -> Vec<ScheduledTask> {
        let tasks = &*self.tasks;
        let candidates: Vec<TaskName> = tasks
            .values()
            .filter(|info| {
                matches!(info.run_state, Some(RunState::Pending)) && deps_satisfied(tasks, info)
            })
            .map(|info| info.name.clone())
            .collect();

        let mut ready = Vec::with_capacity(candidates.len());

        for name in candidates {
            if let Some(info) = self.tasks.get_mut(&name) {
                let is_rerun = info.last_successful_run.is_some() || info.last_failed_run.is_some();

                info!(
                    task = %info.name,
                    action = %info.action,
                    run_id = self.current_run_id,
                    rerun = is_rerun,
                    "scheduling task"
                );

                info.run_state = Some(RunState::Running);
                ready.push(ScheduledTask::from_task_info(
                    info,
                    self.current_run_id.unwrap_or(0),
                ));
            }
        }

        ready
    }

    /// Check if all tasks are in a terminal state.
    pub fn all_tasks_terminal(&self) -> bool {
        !self.tasks.values().any(|info| {
            matches!(
                info.run_state,
                Some(RunState::Pending) | Some(RunState::Running)
            )
        })
    }
}

/// Whether all dependencies of `info` are satisfied for the current run.
///
/// A dependency is satisfied if it succeeded in this run, or if it is not
/// part of this run and succeeded in an earlier one.
fn deps_satisfied(tasks: &BTreeMap<TaskName, TaskInfo>, info: &TaskInfo) -> bool {
    info.deps.iter().all(|dep_name| {
        let Some(dep) = tasks.get(dep_name) else {
            warn!(
                task = %info.name,
                dep = %dep_name,
                "dependency missing from tasks map"
            );
            return false;
        };

        match dep.run_state {
            Some(RunState::DoneSuccess) => true,
            Some(RunState::DoneFailed) | Some(RunState::Pending) | Some(RunState::Running) => false,
            None => dep.last_successful_run.is_some(),
        }
    })
}
