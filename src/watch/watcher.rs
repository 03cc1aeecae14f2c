// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dag::DagGraph;
use crate::engine::RuntimeEvent;
use crate::fs::FileSystem;
use crate::watch::event_handler::{aggregate_hash, process_file_change, WatchContext};
use crate::watch::hash::{HashStore, MemoryHashStore};
use crate::watch::patterns::TaskWatchProfile;

/// Keeps the underlying `RecommendedWatcher` alive; dropping it stops
/// file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Watch `root` recursively and send `RuntimeEvent::TaskTriggered` for tasks
/// whose patterns match a changed path.
///
/// Hashes of `use_hash` tasks are seeded before watching starts, so the
/// first event only triggers when content actually differs.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    profiles: Vec<TaskWatchProfile>,
    graph: Arc<DagGraph>,
    fs: Arc<dyn FileSystem>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = fs.canonicalize(&root).unwrap_or(root);

    let mut store = MemoryHashStore::new();
    for profile in profiles.iter().filter(|p| p.use_hash()) {
        match aggregate_hash(fs.as_ref(), &root, profile) {
            Ok(hash) => store.save(profile.name(), &hash),
            Err(err) => warn!(task = %profile.name(), error = %err, "failed to seed content hash"),
        }
    }

    let store: Box<dyn HashStore> = Box::new(store);
    let ctx = WatchContext {
        root: root.clone(),
        profiles: Arc::new(profiles),
        graph,
        fs,
        hash_store: Arc::new(Mutex::new(store)),
    };

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let _ = event_tx.send(event);
            }
            Err(err) => {
                warn!("file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!("watching {:?} for changes", root);

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            // Reads by the generator itself must not re-trigger it.
            if matches!(event.kind, EventKind::Access(_)) {
                continue;
            }
            debug!(?event, "received notify event");

            for path in &event.paths {
                if !process_file_change(&ctx, path, &runtime_tx).await {
                    debug!("runtime channel closed; stopping watch loop");
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}
