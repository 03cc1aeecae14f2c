// src/watch/dag_filter.rs

//! Graph-aware filtering of watch matches.

use std::collections::{BTreeSet, HashSet};

use crate::dag::DagGraph;

/// Return true if some task depending on `task` (transitively) is also in
/// `matching_names`.
///
/// Triggering a task pulls its dependencies into the run, so when one path
/// matches both `hugo` and `build` (after hugo) only `build` needs a trigger.
pub fn has_descendant_in_matching(
    task: &str,
    matching_names: &BTreeSet<String>,
    graph: &DagGraph,
) -> bool {
    let mut stack: Vec<String> = graph.dependents_of(task).to_vec();
    let mut visited: HashSet<String> = HashSet::new();

    while let Some(current) = stack.pop() {
        if !visited.insert(current.clone()) {
            continue;
        }
        if matching_names.contains(&current) {
            return true;
        }
        stack.extend(graph.dependents_of(&current).iter().cloned());
    }

    false
}

/// The subset of `matching_names` that has no descendant in the set.
pub fn roots_for_path(matching_names: &BTreeSet<String>, graph: &DagGraph) -> Vec<String> {
    matching_names
        .iter()
        .filter(|name| !has_descendant_in_matching(name, matching_names, graph))
        .cloned()
        .collect()
}
