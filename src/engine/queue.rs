// src/engine/queue.rs

use std::collections::{BTreeSet, VecDeque};

use tracing::{debug, warn};

use super::TaskName;
use crate::types::TriggerWhileRunningBehaviour;

/// Triggers that arrive for tasks already taking part in the active run.
///
/// - Each queued entry is a *batch* of task names to trigger together in a
///   future run.
/// - `max_runs` (`[config].queue_length`) bounds how many batches are kept;
///   the oldest is dropped first.
/// - When the scheduler goes idle the runtime calls [`drain_pending`], which
///   merges every batch into one set of roots for the next run.
///
/// Saving three templates during one site build therefore causes exactly
/// one follow-up build.
///
/// [`drain_pending`]: TriggerQueue::drain_pending
#[derive(Debug)]
pub struct TriggerQueue {
    behaviour: TriggerWhileRunningBehaviour,
    max_runs: usize,
    runs: VecDeque<BTreeSet<TaskName>>,
}

impl TriggerQueue {
    /// `max_runs` is clamped to at least 1.
    pub fn new(behaviour: TriggerWhileRunningBehaviour, max_runs: usize) -> Self {
        Self {
            behaviour,
            max_runs: max_runs.max(1),
            runs: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Record that `task` was triggered while it is part of the active run.
    ///
    /// - `Queue`: merge into the last batch (or start one), then drop the
    ///   oldest batches beyond `max_runs`.
    /// - `Cancel`: forget everything queued so far and keep only this task.
    pub fn record_trigger(&mut self, task: &str) {
        let name = task.to_string();

        match self.behaviour {
            TriggerWhileRunningBehaviour::Queue => {
                if let Some(last_batch) = self.runs.back_mut() {
                    let inserted = last_batch.insert(name.clone());
                    debug!(task = %name, inserted, "merged trigger into queued batch");
                } else {
                    self.runs.push_back(BTreeSet::from([name.clone()]));
                    debug!(task = %name, "queued trigger for next run");
                }

                if self.runs.len() > self.max_runs {
                    warn!(
                        current_batches = self.runs.len(),
                        max_runs = self.max_runs,
                        "exceeded queue_length; dropping oldest queued batches"
                    );
                    while self.runs.len() > self.max_runs {
                        self.runs.pop_front();
                    }
                }
            }
            TriggerWhileRunningBehaviour::Cancel => {
                debug!(task = %name, "replacing queued triggers with this task (cancel mode)");
                self.runs.clear();
                self.runs.push_back(BTreeSet::from([name]));
            }
        }
    }

    /// Drain every queued batch into one sorted list of roots.
    pub fn drain_pending(&mut self) -> Vec<TaskName> {
        let mut merged: BTreeSet<TaskName> = BTreeSet::new();

        while let Some(batch) = self.runs.pop_front() {
            merged.extend(batch);
        }

        if !merged.is_empty() {
            debug!(drained = merged.len(), "drained queued triggers into new run");
        }
        merged.into_iter().collect()
    }
}
