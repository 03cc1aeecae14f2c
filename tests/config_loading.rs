// tests/config_loading.rs

use std::error::Error;
use std::fs;

use sitepipe::config::{load_and_validate, load_or_builtin, ConfigFile};
use sitepipe::errors::PipelineError;
use sitepipe::types::{TaskAction, TriggerWhileRunningBehaviour};
use sitepipe_test_utils::builders::{ConfigFileBuilder, TaskConfigBuilder};
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

const FULL_CONFIG: &str = r#"
[config]
triggered_while_running_behaviour = "cancel"
queue_length = 2

[site]
generator = "zola"
output = "public"
output_flag = "--output-dir"
source_flag = "--root"

[server]
port = 8080

[default]
exclude = ["**/*.swp"]

[task.svg]
action = "icons"
watch = ["site/static/img/icons/*.svg"]

[task.hugo]
action = "site"
after = ["svg"]
args = ["--buildDrafts"]
watch = ["site/**/*"]

[task.lint]
action = "command"
cmd = "npm run lint"

[task.build]
after = ["hugo", "lint"]
"#;

fn expect_config_error(raw: sitepipe::config::RawConfigFile) -> String {
    match ConfigFile::try_from(raw) {
        Err(PipelineError::ConfigError(msg)) | Err(PipelineError::DagCycle(msg)) => msg,
        Err(other) => panic!("unexpected error kind: {other}"),
        Ok(_) => panic!("config should have been rejected"),
    }
}

#[test]
fn loads_full_config_from_file() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("Sitepipe.toml");
    fs::write(&path, FULL_CONFIG)?;

    let cfg = load_and_validate(&path)?;

    assert_eq!(
        cfg.config_section().triggered_while_running_behaviour,
        TriggerWhileRunningBehaviour::Cancel
    );
    assert_eq!(cfg.config_section().queue_length, 2);
    assert_eq!(cfg.site().generator, "zola");
    assert_eq!(cfg.site().output, "public");
    // Unset keys keep their defaults.
    assert_eq!(cfg.site().source, "site");
    assert_eq!(cfg.server().port, 8080);
    assert_eq!(cfg.server().host, "127.0.0.1");

    let hugo = cfg.task("hugo").ok_or("missing hugo")?;
    assert_eq!(hugo.action, TaskAction::Site);
    assert_eq!(hugo.args, vec!["--buildDrafts"]);
    assert_eq!(cfg.task("build").ok_or("missing build")?.action, TaskAction::Group);
    assert_eq!(
        cfg.task("lint").ok_or("missing lint")?.cmd.as_deref(),
        Some("npm run lint")
    );
    assert!(!cfg.uses_admin());

    Ok(())
}

#[test]
fn existing_file_sets_project_root() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("Sitepipe.toml");
    fs::write(&path, FULL_CONFIG)?;

    let (cfg, root) = load_or_builtin(&path, true)?;

    assert_eq!(root, dir.path());
    // --icons only affects the built-in pipeline.
    assert!(cfg.task("server").is_none());
    Ok(())
}

#[test]
fn missing_file_falls_back_to_builtin() -> TestResult {
    let dir = tempdir()?;
    let (cfg, _root) = load_or_builtin(dir.path().join("nope.toml"), false)?;

    assert!(cfg.task("build").is_some());
    assert!(cfg.task("build-preview").is_some());
    assert_eq!(cfg.task("server").map(|t| t.action), Some(TaskAction::Serve));
    assert!(cfg.uses_admin());
    Ok(())
}

#[test]
fn invalid_toml_is_reported() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("Sitepipe.toml");
    fs::write(&path, "[task.hugo\naction = ")?;

    assert!(matches!(load_and_validate(&path), Err(PipelineError::TomlError(_))));
    Ok(())
}

#[test]
fn unknown_action_is_rejected_by_toml() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("Sitepipe.toml");
    fs::write(&path, "[task.x]\naction = \"deploy\"\n")?;

    assert!(matches!(load_and_validate(&path), Err(PipelineError::TomlError(_))));
    Ok(())
}

#[test]
fn rejects_unknown_dependency() {
    let raw = ConfigFileBuilder::new()
        .with_task("build", TaskConfigBuilder::group().after("hugo").build())
        .build_raw();
    assert!(expect_config_error(raw).contains("unknown dependency 'hugo'"));
}

#[test]
fn rejects_self_dependency() {
    let raw = ConfigFileBuilder::new()
        .with_task("hugo", TaskConfigBuilder::site().after("hugo").build())
        .build_raw();
    assert!(expect_config_error(raw).contains("cannot depend on itself"));
}

#[test]
fn rejects_cycles() {
    let raw = ConfigFileBuilder::new()
        .with_task("a", TaskConfigBuilder::group().after("b").build())
        .with_task("b", TaskConfigBuilder::group().after("a").build())
        .build_raw();
    assert!(matches!(
        ConfigFile::try_from(raw),
        Err(PipelineError::DagCycle(_))
    ));
}

#[test]
fn rejects_command_without_cmd() {
    let mut task = TaskConfigBuilder::command("x").build();
    task.cmd = Some("   ".to_string());
    let raw = ConfigFileBuilder::new().with_task("lint", task).build_raw();
    assert!(expect_config_error(raw).contains("no `cmd`"));
}

#[test]
fn rejects_cmd_on_other_actions() {
    let mut task = TaskConfigBuilder::site().build();
    task.cmd = Some("hugo".to_string());
    let raw = ConfigFileBuilder::new().with_task("hugo", task).build_raw();
    assert!(expect_config_error(raw).contains("sets `cmd`"));
}

#[test]
fn rejects_args_outside_site_tasks() {
    let mut task = TaskConfigBuilder::admin().build();
    task.args = vec!["--minify".to_string()];
    let raw = ConfigFileBuilder::new().with_task("cms", task).build_raw();
    assert!(expect_config_error(raw).contains("sets `args`"));
}

#[test]
fn rejects_dependency_on_serve_task() {
    let raw = ConfigFileBuilder::new()
        .with_task("server", TaskConfigBuilder::serve().build())
        .with_task("after-server", TaskConfigBuilder::group().after("server").build())
        .build_raw();
    assert!(expect_config_error(raw).contains("serve task"));
}

#[test]
fn rejects_zero_queue_length_and_empty_config() {
    let raw = ConfigFileBuilder::new()
        .with_task("hugo", TaskConfigBuilder::site().build())
        .with_queue_length(0)
        .build_raw();
    assert!(expect_config_error(raw).contains("queue_length"));

    let raw = ConfigFileBuilder::new().build_raw();
    assert!(expect_config_error(raw).contains("at least one"));
}
