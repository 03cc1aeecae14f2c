// src/exec/mod.rs

//! Execution layer.
//!
//! Runs the actions behind scheduled tasks and reports back to the runtime
//! via `RuntimeEvent`s.
//!
//! - [`context`] holds the shared [`PipelineContext`].
//! - [`executor_loop`] owns the loop that spawns one tokio task per
//!   scheduled task.
//! - [`task_runner`] runs a single task, sends live-reload notifications
//!   and emits `TaskCompleted`.
//! - [`backend`] provides the `ExecutorBackend` trait and the production
//!   `RealExecutorBackend`, which tests replace with a fake.

pub mod backend;
pub mod context;
pub mod executor_loop;
pub mod task_runner;

pub use backend::{ExecutorBackend, RealExecutorBackend};
pub use context::PipelineContext;
pub use executor_loop::spawn_executor;
