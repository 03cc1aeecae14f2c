// tests/scheduler_properties.rs

use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;
use sitepipe::config::ConfigFile;
use sitepipe::dag::{Scheduler, TaskRunState};
use sitepipe::engine::TaskOutcome;
use sitepipe_test_utils::builders::{ConfigFileBuilder, TaskConfigBuilder};

/// Random acyclic configs: task N may only depend on tasks 0..N.
fn dag_config_strategy(max_tasks: usize) -> impl Strategy<Value = ConfigFile> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_tasks),
            num_tasks,
        )
        .prop_map(move |raw_deps| {
            let mut builder = ConfigFileBuilder::new();
            for (i, potential_deps) in raw_deps.into_iter().enumerate() {
                let mut task = TaskConfigBuilder::command(&format!("echo task_{i}"));
                if i > 0 {
                    let deps: BTreeSet<usize> = potential_deps.iter().map(|d| d % i).collect();
                    for dep in deps {
                        task = task.after(&format!("task_{dep}"));
                    }
                }
                builder = builder.with_task(&format!("task_{i}"), task.build());
            }
            builder.build()
        })
    })
}

proptest! {
    /// Every run terminates, no task runs before its dependencies succeed,
    /// and a task with a failed dependency never runs.
    #[test]
    fn runs_terminate_and_respect_dependencies(
        cfg in dag_config_strategy(10),
        triggers in proptest::collection::vec(0..10usize, 1..5),
        failing in proptest::collection::vec(0..10usize, 0..3),
    ) {
        let mut scheduler = Scheduler::from_config(&cfg);
        let names: Vec<String> = scheduler.task_names().map(str::to_string).collect();

        let failing: HashSet<String> = failing
            .iter()
            .filter_map(|&i| names.get(i).cloned())
            .collect();

        let mut executing: Vec<String> = Vec::new();
        let mut succeeded: HashSet<String> = HashSet::new();
        let mut failed: HashSet<String> = HashSet::new();

        for t in triggers.iter().filter_map(|&i| names.get(i)) {
            executing.extend(scheduler.handle_trigger(t).into_iter().map(|s| s.name));
        }

        let mut steps = 0;
        while !executing.is_empty() {
            let task = executing.remove(0);
            steps += 1;
            prop_assert!(steps <= names.len(), "a task ran twice in one run");

            let deps = cfg.task(&task).map(|t| t.after.clone()).unwrap_or_default();
            for dep in &deps {
                prop_assert!(succeeded.contains(dep), "{} ran before {}", task, dep);
            }

            let outcome = if failing.contains(&task) {
                failed.insert(task.clone());
                TaskOutcome::Failed(1)
            } else {
                succeeded.insert(task.clone());
                TaskOutcome::Success
            };
            executing.extend(scheduler.handle_completion(&task, outcome).into_iter().map(|s| s.name));
        }

        prop_assert!(scheduler.is_idle(), "run left unfinished with nothing executing");

        for name in &names {
            if let Some(TaskRunState::DoneFailed) = scheduler.run_state_of(name) {
                prop_assert!(!succeeded.contains(name));
            }
        }
    }
}
