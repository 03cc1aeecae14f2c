// src/dag/graph.rs

use std::collections::{BTreeMap, BTreeSet};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::ConfigFile;
use crate::engine::TaskName;
use crate::errors::{PipelineError, Result};
use crate::types::TaskAction;

/// Internal node structure: the task's action plus immediate edges.
#[derive(Debug, Clone)]
struct DagNode {
    action: TaskAction,
    /// Direct dependencies: tasks that must succeed before this one can run.
    deps: Vec<TaskName>,
    /// Direct dependents: tasks that depend on this one.
    dependents: Vec<TaskName>,
}

/// The task graph: task name -> {action, dependencies}.
///
/// Built once from a validated [`ConfigFile`] and handed to the scheduler.
/// Nodes are kept in a `BTreeMap` so iteration order (and therefore dry-run
/// output and dispatch order of simultaneously ready tasks) is stable.
#[derive(Debug, Clone)]
pub struct DagGraph {
    nodes: BTreeMap<TaskName, DagNode>,
}

impl DagGraph {
    /// Build the graph from a validated [`ConfigFile`].
    pub fn from_config(cfg: &ConfigFile) -> Self {
        let mut nodes: BTreeMap<TaskName, DagNode> = cfg
            .tasks()
            .iter()
            .map(|(name, task)| {
                (
                    name.clone(),
                    DagNode {
                        action: task.action,
                        deps: task.after.clone(),
                        dependents: Vec::new(),
                    },
                )
            })
            .collect();

        for (name, task) in cfg.tasks().iter() {
            for dep in &task.after {
                if let Some(dep_node) = nodes.get_mut(dep) {
                    dep_node.dependents.push(name.clone());
                }
            }
        }

        Self { nodes }
    }

    /// Return all task names.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn action_of(&self, name: &str) -> Option<TaskAction> {
        self.nodes.get(name).map(|n| n.action)
    }

    /// Immediate dependencies of a task (the tasks listed in its `after`).
    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task (tasks that list this one in their `after`).
    pub fn dependents_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// `name` plus everything it transitively depends on.
    pub fn upstream_closure(&self, name: &str) -> BTreeSet<TaskName> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![name.to_string()];

        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(&current) || !seen.insert(current.clone()) {
                continue;
            }
            stack.extend(self.dependencies_of(&current).iter().cloned());
        }

        seen
    }

    /// All tasks in dependency order (dependencies first).
    ///
    /// Fails with [`PipelineError::DagCycle`] if the graph has a cycle.
    pub fn topological_order(&self) -> Result<Vec<TaskName>> {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for name in self.nodes.keys() {
            graph.add_node(name.as_str());
        }
        for (name, node) in &self.nodes {
            for dep in &node.deps {
                graph.add_edge(dep.as_str(), name.as_str(), ());
            }
        }

        toposort(&graph, None)
            .map(|order| order.into_iter().map(|s| s.to_string()).collect())
            .map_err(|cycle| {
                PipelineError::DagCycle(format!(
                    "cycle detected in task graph involving task '{}'",
                    cycle.node_id()
                ))
            })
    }

    /// Tasks from `topological_order` restricted to the upstream closure of
    /// `target`; this is the order a dry run prints for that target.
    pub fn plan_for(&self, target: &str) -> Result<Vec<TaskName>> {
        if !self.contains(target) {
            return Err(PipelineError::TaskNotFound(target.to_string()));
        }
        let closure = self.upstream_closure(target);
        Ok(self
            .topological_order()?
            .into_iter()
            .filter(|t| closure.contains(t))
            .collect())
    }
}
