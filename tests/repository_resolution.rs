// tests/repository_resolution.rs

use anyhow::anyhow;
use proptest::prelude::*;
use sitepipe::repository::{extract_repo_identifier, resolve_repo_identifier};

const REMOTES: &str = "origin\tgit@github.com:acme/site.git (fetch)\n\
                       origin\tgit@github.com:acme/site.git (push)\n";

#[test]
fn environment_value_wins_over_git() {
    let ident = resolve_repo_identifier(Some("git@github.com:env/override.git".to_string()), || {
        panic!("git must not be consulted when the variable is set")
    });
    assert_eq!(ident.as_deref(), Some("env/override"));
}

#[test]
fn falls_back_to_git_remotes() {
    let ident = resolve_repo_identifier(None, || Ok(REMOTES.to_string()));
    assert_eq!(ident.as_deref(), Some("acme/site"));
}

#[test]
fn failing_git_yields_none() {
    let ident = resolve_repo_identifier(None, || Err(anyhow!("not a git repository")));
    assert_eq!(ident, None);
}

#[test]
fn non_github_remote_yields_none() {
    let ident = resolve_repo_identifier(None, || {
        Ok("origin\thttps://gitlab.com/acme/site.git (fetch)\n".to_string())
    });
    assert_eq!(ident, None);
}

#[test]
fn bare_remote_without_suffix() {
    assert_eq!(
        extract_repo_identifier("github.com:owner/repo").as_deref(),
        Some("owner/repo")
    );
}

proptest! {
    /// Any `owner/repo` survives the round trip through an SSH remote URL,
    /// with or without the `.git` suffix.
    #[test]
    fn ssh_remote_yields_owner_and_repo(
        owner in "[A-Za-z0-9_.-]+",
        repo in "[A-Za-z0-9_.-]+",
    ) {
        // A repo literally named `x.git` is indistinguishable from `x` plus suffix.
        prop_assume!(!repo.ends_with(".git"));
        let expected = format!("{owner}/{repo}");

        prop_assert_eq!(
            extract_repo_identifier(&format!("git@github.com:{owner}/{repo}")),
            Some(expected.clone())
        );
        prop_assert_eq!(
            extract_repo_identifier(&format!("git@github.com:{owner}/{repo}.git")),
            Some(expected.clone())
        );
        prop_assert_eq!(
            extract_repo_identifier(&format!("origin\tgit@github.com:{owner}/{repo}.git (fetch)\n")),
            Some(expected)
        );
    }
}
