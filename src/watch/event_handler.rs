// src/watch/event_handler.rs

//! Turning a changed path into task triggers.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dag::DagGraph;
use crate::engine::{RuntimeEvent, TriggerReason};
use crate::fs::FileSystem;
use crate::watch::dag_filter::roots_for_path;
use crate::watch::hash::{compute_aggregate_hash, compute_file_hash, hash_changed, HashStore};
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::{collect_matching_files, TaskWatchProfile};

/// Shared state of the watch loop.
#[derive(Clone)]
pub struct WatchContext {
    pub root: PathBuf,
    pub profiles: Arc<Vec<TaskWatchProfile>>,
    pub graph: Arc<DagGraph>,
    pub fs: Arc<dyn FileSystem>,
    pub hash_store: Arc<Mutex<Box<dyn HashStore>>>,
}

/// Tasks to trigger for a path relative to the project root.
///
/// Keeps only matching tasks with no matching descendant, since triggering
/// a task already brings its dependencies along.
pub fn tasks_for_path(
    rel_path: &str,
    profiles: &[TaskWatchProfile],
    graph: &DagGraph,
) -> Vec<String> {
    let matching: BTreeSet<String> = profiles
        .iter()
        .filter(|p| p.matches(rel_path))
        .map(|p| p.name().to_string())
        .collect();

    if matching.is_empty() {
        return Vec::new();
    }

    roots_for_path(&matching, graph)
}

/// Process a single changed path and send triggers to the runtime.
///
/// Returns `false` once the runtime channel is closed.
pub async fn process_file_change(
    ctx: &WatchContext,
    path: &Path,
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
) -> bool {
    let Some(rel_str) = relative_str(&ctx.root, path) else {
        debug!(?path, "changed path outside project root; ignoring");
        return true;
    };

    let tasks = tasks_for_path(&rel_str, &ctx.profiles, &ctx.graph);
    if tasks.is_empty() {
        return true;
    }
    debug!(rel = %rel_str, ?tasks, "watch match");

    for task in tasks {
        let Some(profile) = ctx.profiles.iter().find(|p| p.name() == task) else {
            continue;
        };

        if profile.use_hash() && !content_changed(ctx, profile).await {
            info!(task = %task, path = %rel_str, "watched content unchanged; skipping trigger");
            continue;
        }

        info!(task = %task, path = %rel_str, "change detected; triggering task");
        if let Err(err) = runtime_tx
            .send(RuntimeEvent::TaskTriggered {
                task,
                reason: TriggerReason::FileWatch,
            })
            .await
        {
            warn!("failed to send RuntimeEvent::TaskTriggered: {err}");
            return false;
        }
    }

    true
}

/// Hash every file the profile watches and compare with the stored hash.
///
/// Hashing errors count as a change.
async fn content_changed(ctx: &WatchContext, profile: &TaskWatchProfile) -> bool {
    let ctx = ctx.clone();
    let profile = profile.clone();

    tokio::task::spawn_blocking(move || {
        let hash = match aggregate_hash(ctx.fs.as_ref(), &ctx.root, &profile) {
            Ok(hash) => hash,
            Err(err) => {
                warn!(task = %profile.name(), error = %err, "failed to hash watched files; triggering anyway");
                return true;
            }
        };

        match ctx.hash_store.lock() {
            Ok(mut store) => hash_changed(&mut **store, profile.name(), &hash),
            Err(_) => {
                warn!(task = %profile.name(), "hash store mutex poisoned; triggering anyway");
                true
            }
        }
    })
    .await
    .unwrap_or(true)
}

/// Aggregate blake3 hash of all files the profile watches.
pub fn aggregate_hash(fs: &dyn FileSystem, root: &Path, profile: &TaskWatchProfile) -> Result<String> {
    let hashes = collect_matching_files(fs, root, profile)?
        .iter()
        .map(|file| compute_file_hash(fs, file))
        .collect::<Result<Vec<_>>>()?;
    Ok(compute_aggregate_hash(&hashes))
}
