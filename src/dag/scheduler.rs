// src/dag/scheduler.rs

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::config::model::ConfigFile;
use crate::dag::graph::DagGraph;
use crate::dag::scheduler_step::SchedulerStep;
use crate::dag::state_manager::StateManager;
use crate::dag::task_info::{RunState, ScheduledTask, TaskInfo, TaskRunState};
use crate::engine::{TaskName, TaskOutcome};

/// Scheduler holds the immutable task graph plus mutable per-run state.
///
/// It is responsible for:
/// - remembering which tasks are part of the current run
/// - pulling a requested task's dependencies into the run
/// - deciding when a pending task is ready (deps satisfied)
/// - failing dependents when a task fails
#[derive(Debug)]
pub struct Scheduler {
    graph: DagGraph,
    tasks: BTreeMap<TaskName, TaskInfo>,
    /// Monotonically increasing run ID.
    run_counter: u64,
    /// Currently active run ID, or `None` if there is no active run.
    current_run_id: Option<u64>,
}

impl Scheduler {
    /// Construct a scheduler from a validated [`ConfigFile`].
    pub fn from_config(cfg: &ConfigFile) -> Self {
        let graph = DagGraph::from_config(cfg);

        let tasks = cfg
            .tasks()
            .iter()
            .map(|(name, tc)| {
                let deps = graph.dependencies_of(name).to_vec();
                (name.clone(), TaskInfo::from_config(name.clone(), tc, deps))
            })
            .collect();

        Self {
            graph,
            tasks,
            run_counter: 0,
            current_run_id: None,
        }
    }

    /// Returns `true` if there is currently no active run.
    pub fn is_idle(&self) -> bool {
        self.current_run_id.is_none()
    }

    /// Read-only view of the given task's run state.
    ///
    /// After a run finishes the terminal states stay visible until the next
    /// run starts.
    pub fn run_state_of(&self, task: &str) -> Option<TaskRunState> {
        let info = self.tasks.get(task)?;
        Some(info.run_state.into())
    }

    /// Start a new run, resetting per-run state but keeping historical
    /// success information.
    pub fn start_new_run(&mut self) {
        self.run_counter += 1;
        self.current_run_id = Some(self.run_counter);

        for info in self.tasks.values_mut() {
            info.run_state = None;
        }

        debug!(run_id = self.run_counter, "scheduler: starting new run");
    }

    /// Request `task` (and, transitively, its dependencies) in the current run.
    pub fn handle_trigger(&mut self, task: &str) -> Vec<ScheduledTask> {
        self.trigger_step_internal(task).newly_scheduled
    }

    /// Record the outcome of a finished task.
    pub fn handle_completion(&mut self, task: &str, outcome: TaskOutcome) -> Vec<ScheduledTask> {
        self.completion_step_internal(task, outcome).newly_scheduled
    }

    /// Like [`handle_trigger`](Self::handle_trigger) but returns the full
    /// [`SchedulerStep`].
    pub fn step_trigger(&mut self, task: &str) -> SchedulerStep {
        self.trigger_step_internal(task)
    }

    /// Like [`handle_completion`](Self::handle_completion) but returns the
    /// full [`SchedulerStep`].
    pub fn step_completion(&mut self, task: &str, outcome: TaskOutcome) -> SchedulerStep {
        self.completion_step_internal(task, outcome)
    }

    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.graph.tasks()
    }

    /// Clear `current_run_id` if every task is terminal.
    ///
    /// Returns `true` if this call moved the scheduler from running to idle.
    fn maybe_finish_run(&mut self) -> bool {
        if self.current_run_id.is_none() {
            return false;
        }

        let manager = StateManager::new(&self.graph, &mut self.tasks, self.current_run_id);

        if manager.all_tasks_terminal() {
            info!(run_id = self.current_run_id, "scheduler: run finished");
            self.current_run_id = None;
            true
        } else {
            false
        }
    }

    fn trigger_step_internal(&mut self, task: &str) -> SchedulerStep {
        if self.current_run_id.is_none() {
            debug!(task = %task, "trigger with no active run; starting a new run");
            self.start_new_run();
        }

        let mut manager = StateManager::new(&self.graph, &mut self.tasks, self.current_run_id);
        if self.graph.contains(task) {
            manager.mark_task_and_dependencies_pending(task);
        } else {
            warn!(task = %task, "trigger for unknown task; ignoring");
        }

        let newly_scheduled = manager.collect_new_ready_tasks();
        let run_just_finished = self.maybe_finish_run();

        SchedulerStep {
            newly_scheduled,
            newly_failed: Vec::new(),
            run_just_finished,
        }
    }

    fn completion_step_internal(&mut self, task: &str, outcome: TaskOutcome) -> SchedulerStep {
        let Some(run_id) = self.current_run_id else {
            warn!(task = %task, "completion with no active run; ignoring");
            return SchedulerStep::default();
        };

        let mut newly_scheduled = Vec::new();
        let mut newly_failed = Vec::new();

        match self.tasks.get_mut(task) {
            Some(info) => match outcome {
                TaskOutcome::Success => {
                    info.run_state = Some(RunState::DoneSuccess);
                    info.last_successful_run = Some(run_id);
                    debug!(task = %info.name, run_id, "task completed successfully");
                    let mut manager =
                        StateManager::new(&self.graph, &mut self.tasks, self.current_run_id);
                    newly_scheduled.extend(manager.collect_new_ready_tasks());
                }
                TaskOutcome::Failed(code) => {
                    info.run_state = Some(RunState::DoneFailed);
                    info.last_failed_run = Some(run_id);
                    warn!(
                        task = %info.name,
                        run_id,
                        exit_code = code,
                        "task failed; failing dependents in this run"
                    );
                    newly_failed.push(info.name.clone());
                    let mut manager =
                        StateManager::new(&self.graph, &mut self.tasks, self.current_run_id);
                    newly_failed.append(&mut manager.mark_dependents_failed(task));
                }
            },
            None => {
                warn!(task = %task, "completion for unknown task; ignoring");
            }
        }

        let run_just_finished = self.maybe_finish_run();

        SchedulerStep {
            newly_scheduled,
            newly_failed,
            run_just_finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RawConfigFile, TaskConfig};
    use crate::types::TaskAction;

    fn chain() -> Scheduler {
        let mut raw = RawConfigFile::default();
        raw.task.insert(
            "svg".into(),
            TaskConfig {
                action: TaskAction::Icons,
                ..TaskConfig::default()
            },
        );
        raw.task.insert(
            "hugo".into(),
            TaskConfig {
                action: TaskAction::Site,
                after: vec!["svg".into()],
                ..TaskConfig::default()
            },
        );
        raw.task.insert(
            "build".into(),
            TaskConfig {
                after: vec!["hugo".into()],
                ..TaskConfig::default()
            },
        );
        raw.task.insert(
            "cms".into(),
            TaskConfig {
                action: TaskAction::Admin,
                ..TaskConfig::default()
            },
        );
        let cfg = ConfigFile::try_from(raw).expect("valid config");
        Scheduler::from_config(&cfg)
    }

    fn names(tasks: &[ScheduledTask]) -> Vec<&str> {
        tasks.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn trigger_pulls_in_dependencies_and_runs_leaves_first() {
        let mut s = chain();

        let step = s.step_trigger("build");
        assert_eq!(names(&step.newly_scheduled), vec!["svg"]);
        assert_eq!(s.run_state_of("build"), Some(TaskRunState::Pending));

        let next = s.handle_completion("svg", TaskOutcome::Success);
        assert_eq!(names(&next), vec!["hugo"]);

        let next = s.handle_completion("hugo", TaskOutcome::Success);
        assert_eq!(names(&next), vec!["build"]);

        let step = s.step_completion("build", TaskOutcome::Success);
        assert!(step.run_just_finished);
        assert!(s.is_idle());
        assert_eq!(s.run_state_of("build"), Some(TaskRunState::DoneSuccess));
    }

    #[test]
    fn failure_fails_every_dependent() {
        let mut s = chain();
        s.handle_trigger("build");

        let step = s.step_completion("svg", TaskOutcome::Failed(2));
        assert!(step.newly_scheduled.is_empty());
        assert_eq!(step.newly_failed, vec!["svg", "hugo", "build"]);
        assert!(step.run_just_finished);
        assert_eq!(s.run_state_of("build"), Some(TaskRunState::DoneFailed));
    }

    #[test]
    fn task_joining_after_dependency_failed_does_not_hang() {
        let mut s = chain();
        s.handle_trigger("svg");
        s.handle_trigger("cms");
        s.handle_completion("svg", TaskOutcome::Failed(1));
        assert!(!s.is_idle());

        // cms keeps the run open while build joins behind the failed svg.
        let step = s.step_trigger("build");
        assert!(step.newly_scheduled.is_empty());
        assert_eq!(s.run_state_of("hugo"), Some(TaskRunState::DoneFailed));
        assert_eq!(s.run_state_of("build"), Some(TaskRunState::DoneFailed));

        let step = s.step_completion("cms", TaskOutcome::Success);
        assert!(step.run_just_finished);
    }

    #[test]
    fn unknown_trigger_finishes_empty_run() {
        let mut s = chain();
        let step = s.step_trigger("nope");
        assert!(step.newly_scheduled.is_empty());
        assert!(step.run_just_finished);
        assert!(s.is_idle());
    }
}
