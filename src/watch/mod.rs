// src/watch/mod.rs

//! File watching and change detection for the dev server.
//!
//! - Compiling `watch` / `exclude` glob patterns per task.
//! - A cross-platform filesystem watcher (`notify`).
//! - Optional content hashing (`use_hash`) so saving an unchanged file does
//!   not rebuild.

pub mod dag_filter;
pub mod event_handler;
pub mod hash;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use event_handler::tasks_for_path;
pub use hash::{HashStore, MemoryHashStore};
pub use patterns::{build_profiles_from_config, TaskWatchProfile};
pub use watcher::{spawn_watcher, WatcherHandle};
