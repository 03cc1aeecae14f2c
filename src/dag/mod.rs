// src/dag/mod.rs

//! The task graph and the per-run scheduler on top of it.
//!
//! [`DagGraph`] is built once from the validated config. [`Scheduler`]
//! owns a copy of it and tracks which tasks belong to the current run,
//! which are ready, and which failed (directly or through a dependency).

pub mod graph;
pub mod scheduler;
pub mod scheduler_step;
pub mod state_manager;
pub mod task_info;

pub use graph::DagGraph;
pub use scheduler::Scheduler;
pub use scheduler_step::SchedulerStep;
pub use task_info::{ScheduledTask, TaskRunState};
