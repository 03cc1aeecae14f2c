// tests/run_entrypoint.rs
#![cfg(unix)]

use std::error::Error;
use std::fs;
use std::path::Path;

use sitepipe::cli::CliArgs;
use sitepipe::errors::PipelineError;
use sitepipe_test_utils::{init_tracing, with_timeout};
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(root: &Path, generator: &str) -> Result<String, Box<dyn Error>> {
    let path = root.join("Sitepipe.toml");
    fs::write(
        &path,
        format!(
            r#"
[site]
generator = "{generator}"

[task.hugo]
action = "site"

[task.cms]
action = "admin"

[task.build]
after = ["hugo", "cms"]
"#
        ),
    )?;
    Ok(path.to_string_lossy().into_owned())
}

fn args(config: String, target: &str) -> CliArgs {
    CliArgs {
        target: target.to_string(),
        config,
        icons: false,
        log_level: None,
        dry_run: false,
    }
}

#[tokio::test]
async fn failing_generator_fails_the_target() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    fs::create_dir_all(dir.path().join("src/admin"))?;
    fs::write(dir.path().join("src/admin/config.yml"), "repo: x")?;
    let config = write_config(dir.path(), "false")?;

    let res = with_timeout(sitepipe::run(args(config, "build"))).await;

    match res {
        Err(PipelineError::TaskFailed(task)) => assert_eq!(task, "build"),
        other => panic!("expected TaskFailed, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn successful_build_writes_admin_panel() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    fs::create_dir_all(dir.path().join("src/admin"))?;
    fs::write(
        dir.path().join("src/admin/config.yml"),
        "backend:\n  name: github\n",
    )?;
    let config = write_config(dir.path(), "true")?;

    with_timeout(sitepipe::run(args(config, "build"))).await?;

    assert!(dir.path().join("dist/admin/config.yml").is_file());
    Ok(())
}

#[tokio::test]
async fn unknown_target_is_rejected_before_running() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let config = write_config(dir.path(), "true")?;

    match with_timeout(sitepipe::run(args(config, "deploy"))).await {
        Err(PipelineError::TaskNotFound(task)) => assert_eq!(task, "deploy"),
        other => panic!("expected TaskNotFound, got {other:?}"),
    }
    Ok(())
}
