// src/config/builtin.rs

//! The pipeline used when no config file exists.
//!
//! One definition covers both layouts: with `icons = true` an `svg` task is
//! added and the generator waits for it, so the sprite is in place before
//! the site is rendered.

use std::collections::BTreeMap;

use crate::config::model::{RawConfigFile, TaskConfig};
use crate::types::TaskAction;

/// Flags the generator gets for the preview build.
pub const PREVIEW_ARGS: [&str; 2] = ["--buildDrafts", "--buildFuture"];

pub fn builtin_pipeline(icons: bool) -> RawConfigFile {
    let mut raw = RawConfigFile::default();
    let mut tasks: BTreeMap<String, TaskConfig> = BTreeMap::new();

    let site_watch = format!("{}/**/*", raw.site.source);
    let admin_watch = format!("{}/*", raw.admin.source);
    let icons_watch = format!("{}/*.svg", raw.icons.source);

    let generator_deps = if icons {
        vec!["svg".to_string()]
    } else {
        Vec::new()
    };

    tasks.insert(
        "hugo".to_string(),
        TaskConfig {
            action: TaskAction::Site,
            watch: Some(vec![site_watch]),
            after: generator_deps.clone(),
            ..TaskConfig::default()
        },
    );

    tasks.insert(
        "hugo-preview".to_string(),
        TaskConfig {
            action: TaskAction::Site,
            args: PREVIEW_ARGS.iter().map(|s| s.to_string()).collect(),
            after: generator_deps,
            ..TaskConfig::default()
        },
    );

    tasks.insert(
        "cms".to_string(),
        TaskConfig {
            action: TaskAction::Admin,
            watch: Some(vec![admin_watch]),
            ..TaskConfig::default()
        },
    );

    if icons {
        tasks.insert(
            "svg".to_string(),
            TaskConfig {
                action: TaskAction::Icons,
                watch: Some(vec![icons_watch]),
                ..TaskConfig::default()
            },
        );
    }

    tasks.insert(
        "build".to_string(),
        TaskConfig {
            after: vec!["hugo".to_string(), "cms".to_string()],
            ..TaskConfig::default()
        },
    );

    tasks.insert(
        "build-preview".to_string(),
        TaskConfig {
            after: vec!["hugo-preview".to_string()],
            ..TaskConfig::default()
        },
    );

    tasks.insert(
        "server".to_string(),
        TaskConfig {
            action: TaskAction::Serve,
            after: vec!["hugo".to_string(), "cms".to_string()],
            ..TaskConfig::default()
        },
    );

    raw.task = tasks;
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::ConfigFile;

    #[test]
    fn builtin_without_icons_has_no_sprite_task() {
        let cfg = ConfigFile::try_from(builtin_pipeline(false)).unwrap();
        assert!(cfg.task("svg").is_none());
        assert!(cfg.task("hugo").unwrap().after.is_empty());
        assert_eq!(cfg.task("build").unwrap().after, vec!["hugo", "cms"]);
    }

    #[test]
    fn builtin_with_icons_runs_sprite_before_generator() {
        let cfg = ConfigFile::try_from(builtin_pipeline(true)).unwrap();
        assert_eq!(cfg.task("svg").unwrap().action, TaskAction::Icons);
        assert_eq!(cfg.task("hugo").unwrap().after, vec!["svg"]);
        assert_eq!(cfg.task("server").unwrap().action, TaskAction::Serve);
    }

    #[test]
    fn preview_adds_draft_and_future_flags() {
        let raw = builtin_pipeline(false);
        assert_eq!(raw.task["hugo-preview"].args, vec!["--buildDrafts", "--buildFuture"]);
    }
}
