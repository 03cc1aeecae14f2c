// src/repository.rs

//! Resolving the `owner/name` identifier of the GitHub repository the admin
//! panel commits to.

use std::path::Path;
use std::process::Command;
use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use regex::Regex;
use tracing::{debug, warn};

static GITHUB_REMOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"github\.com:(\S+)").expect("valid regex"));

/// Extract `owner/name` from text containing an SSH-style GitHub remote,
/// e.g. the output of `git remote -v` or a `git@github.com:owner/name.git`
/// URL.
///
/// Only the first match counts. A trailing `.git` and trailing slashes are
/// removed; an empty result is `None`.
pub fn extract_repo_identifier(text: &str) -> Option<String> {
    let captured = GITHUB_REMOTE.captures(text)?.get(1)?.as_str();
    let ident = captured.trim_end_matches('/');
    let ident = ident.strip_suffix(".git").unwrap_or(ident);
    let ident = ident.trim_end_matches('/');

    if ident.is_empty() {
        None
    } else {
        Some(ident.to_string())
    }
}

/// Resolve the repository identifier.
///
/// `env_value` (the repository override variable) wins when present;
/// otherwise `list_remotes` is asked for remote text. A failing
/// `list_remotes` and a missing match both yield `None` with a warning.
pub fn resolve_repo_identifier<F>(env_value: Option<String>, list_remotes: F) -> Option<String>
where
    F: FnOnce() -> Result<String>,
{
    let (source, text) = match env_value {
        Some(value) => ("environment", value),
        None => match list_remotes() {
            Ok(text) => ("git remotes", text),
            Err(err) => {
                warn!(error = %err, "could not list git remotes");
                return None;
            }
        },
    };

    match extract_repo_identifier(&text) {
        Some(ident) => {
            debug!(repository = %ident, source, "resolved repository identifier");
            Some(ident)
        }
        None => {
            warn!(
                source,
                "no GitHub repository found; the admin placeholder will be left empty"
            );
            None
        }
    }
}

/// Output of `git remote -v` run in `root`.
pub fn git_remote_listing(root: &Path) -> Result<String> {
    let output = Command::new("git")
        .args(["remote", "-v"])
        .current_dir(root)
        .output()
        .context("running `git remote -v`")?;

    if !output.status.success() {
        bail!(
            "`git remote -v` exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Production resolution: the `env_var` override, else `git remote -v` in
/// `root`.
pub fn resolve_from_environment(env_var: &str, root: &Path) -> Option<String> {
    let env_value = std::env::var(env_var).ok().filter(|v| !v.is_empty());
    resolve_repo_identifier(env_value, || git_remote_listing(root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_git_suffix() {
        assert_eq!(
            extract_repo_identifier("git@github.com:acme/site.git").as_deref(),
            Some("acme/site")
        );
    }

    #[test]
    fn first_remote_wins() {
        let remotes = "origin\tgit@github.com:acme/site.git (fetch)\n\
                       origin\tgit@github.com:acme/site.git (push)\n\
                       fork\tgit@github.com:me/site.git (fetch)\n";
        assert_eq!(extract_repo_identifier(remotes).as_deref(), Some("acme/site"));
    }

    #[test]
    fn https_remote_does_not_match() {
        assert_eq!(extract_repo_identifier("https://github.com/acme/site.git"), None);
    }

    #[test]
    fn trailing_slash_and_empty_capture() {
        assert_eq!(
            extract_repo_identifier("github.com:acme/site/").as_deref(),
            Some("acme/site")
        );
        assert_eq!(extract_repo_identifier("github.com:.git"), None);
    }

    #[test]
    fn slash_after_git_suffix() {
        assert_eq!(
            extract_repo_identifier("git@github.com:acme/site.git/").as_deref(),
            Some("acme/site")
        );
    }
}
