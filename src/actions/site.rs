// src/actions/site.rs

//! Invoking the external static-site generator.

use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::info;

use crate::config::model::SiteSection;
use crate::engine::TaskOutcome;

/// Generator arguments: `[output_flag, output, source_flag, source] ++ extra`.
///
/// `output` is resolved against `root` so the generator writes to the same
/// place regardless of how it interprets relative destinations.
pub fn generator_args(site: &SiteSection, root: &Path, extra: &[String]) -> Vec<String> {
    let output = root.join(&site.output);
    let mut args = vec![
        site.output_flag.clone(),
        output.to_string_lossy().into_owned(),
        site.source_flag.clone(),
        site.source.clone(),
    ];
    args.extend(extra.iter().cloned());
    args
}

/// Run the generator in `root` with inherited stdio and wait for it.
///
/// Errors only when the process cannot be spawned or awaited.
pub async fn run_generator(
    task: &str,
    site: &SiteSection,
    root: &Path,
    extra: &[String],
) -> Result<TaskOutcome> {
    let args = generator_args(site, root, extra);
    info!(task = %task, generator = %site.generator, ?args, "running site generator");

    let status = Command::new(&site.generator)
        .args(&args)
        .current_dir(root)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .status()
        .await
        .with_context(|| format!("spawning site generator `{}` for task '{}'", site.generator, task))?;

    Ok(outcome_from_status(status.success(), status.code()))
}

pub(crate) fn outcome_from_status(success: bool, code: Option<i32>) -> TaskOutcome {
    if success {
        TaskOutcome::Success
    } else {
        // Killed by a signal: no exit code.
        TaskOutcome::Failed(code.unwrap_or(-1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn args_put_extra_flags_last() {
        let site = SiteSection::default();
        let args = generator_args(
            &site,
            Path::new("/proj"),
            &["--buildDrafts".to_string(), "--buildFuture".to_string()],
        );
        assert_eq!(
            args,
            vec!["-d", "/proj/dist", "-s", "site", "--buildDrafts", "--buildFuture"]
        );
    }
}
