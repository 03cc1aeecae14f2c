// src/actions/command.rs

//! Shell command tasks, e.g. the asset bundler.

use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{info, warn};

use crate::actions::site::outcome_from_status;
use crate::engine::TaskOutcome;

fn shell_command(cmd: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    }
}

/// Run `cmd` through the platform shell in `root`, logging its output line
/// by line.
pub async fn run_shell(task: &str, cmd: &str, root: &Path) -> Result<TaskOutcome> {
    info!(task = %task, cmd = %cmd, "starting command");

    let mut child = shell_command(cmd)
        .current_dir(root)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("spawning process for task '{}'", task))?;

    let stdout = child.stdout.take().map(|s| tokio::spawn(forward_lines(task.to_string(), s, false)));
    let stderr = child.stderr.take().map(|s| tokio::spawn(forward_lines(task.to_string(), s, true)));

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of task '{}'", task))?;

    // Drain the remaining output before reporting completion.
    for handle in [stdout, stderr].into_iter().flatten() {
        let _ = handle.await;
    }

    info!(task = %task, exit_code = ?status.code(), success = status.success(), "command exited");
    Ok(outcome_from_status(status.success(), status.code()))
}

async fn forward_lines<R>(task: String, stream: R, is_stderr: bool)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if is_stderr => warn!(task = %task, "{}", line),
            Ok(Some(line)) => info!(task = %task, "{}", line),
            Ok(None) => break,
            Err(err) => {
                warn!(task = %task, error = %err, "failed to read process output");
                break;
            }
        }
    }
}
