// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::model::ConfigFile;
use crate::engine::TaskName;
use crate::fs::FileSystem;

/// Compiled watch/exclude globs for a single task.
///
/// Patterns are relative to the project root; the watcher passes paths like
/// `"site/layouts/index.html"` into [`matches`](Self::matches). A task with
/// no watch patterns never matches.
#[derive(Clone)]
pub struct TaskWatchProfile {
    name: TaskName,
    watch_set: GlobSet,
    exclude_set: Option<GlobSet>,
    use_hash: bool,
}

impl fmt::Debug for TaskWatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskWatchProfile")
            .field("name", &self.name)
            .field("use_hash", &self.use_hash)
            .finish_non_exhaustive()
    }
}

impl TaskWatchProfile {
    /// Compile a profile from already-merged pattern lists.
    pub fn new(
        name: impl Into<TaskName>,
        watch: &[String],
        exclude: &[String],
        use_hash: bool,
    ) -> Result<Self> {
        let name = name.into();
        let watch_set = build_globset(watch)
            .with_context(|| format!("building watch globset for task {name}"))?;
        let exclude_set = if exclude.is_empty() {
            None
        } else {
            Some(
                build_globset(exclude)
                    .with_context(|| format!("building exclude globset for task {name}"))?,
            )
        };

        Ok(Self {
            name,
            watch_set,
            exclude_set,
            use_hash,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether triggers are skipped while the watched content hash is unchanged.
    pub fn use_hash(&self) -> bool {
        self.use_hash
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        self.watch_set.is_match(rel_path)
            && !self
                .exclude_set
                .as_ref()
                .is_some_and(|exclude| exclude.is_match(rel_path))
    }
}

/// Merge a task's own list with the `[default]` list.
///
/// - `append_default = true`: task list followed by the defaults.
/// - Task list present: only the task list.
/// - Otherwise: the defaults.
pub fn effective_patterns(
    task_list: Option<&[String]>,
    default_list: &[String],
    append_default: bool,
) -> Vec<String> {
    match (task_list, append_default) {
        (Some(list), true) => list.iter().chain(default_list).cloned().collect(),
        (Some(list), false) => list.to_vec(),
        (None, _) => default_list.to_vec(),
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?);
    }
    Ok(builder.build()?)
}

/// Compile a [`TaskWatchProfile`] for every task in the config, applying the
/// `[default]` watch/exclude/use_hash settings.
pub fn build_profiles_from_config(cfg: &ConfigFile) -> Result<Vec<TaskWatchProfile>> {
    let defaults = cfg.default_section();
    let default_use_hash = defaults.use_hash.unwrap_or(false);

    cfg.tasks()
        .iter()
        .map(|(name, task)| {
            let watch = effective_patterns(
                task.watch.as_deref(),
                &defaults.watch,
                task.append_default_watch,
            );
            let exclude = effective_patterns(
                task.exclude.as_deref(),
                &defaults.exclude,
                task.append_default_exclude,
            );
            TaskWatchProfile::new(
                name.clone(),
                &watch,
                &exclude,
                task.effective_use_hash(default_use_hash),
            )
        })
        .collect()
}

/// All files under `root` matching `profile`, sorted by path.
///
/// Used to compute the aggregate content hash of a `use_hash` task.
pub fn collect_matching_files(
    fs: &dyn FileSystem,
    root: &Path,
    profile: &TaskWatchProfile,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) {
                let Ok(rel) = path.strip_prefix(root) else {
                    continue;
                };
                if profile.matches(&rel.to_string_lossy().replace('\\', "/")) {
                    files.push(path);
                }
            }
        }
    }

    files.sort();
    Ok(files)
}
