// tests/runtime_fake_executor.rs

use std::error::Error;
use std::sync::{Arc, Mutex};

use sitepipe::config::ConfigFile;
use sitepipe::dag::{Scheduler, TaskRunState};
use sitepipe::engine::{
    CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason,
    TriggerWhileRunningBehaviour,
};
use sitepipe_test_utils::builders::{ConfigFileBuilder, TaskConfigBuilder};
use sitepipe_test_utils::fake_executor::FakeExecutor;
use sitepipe_test_utils::{init_tracing, with_timeout};
use tokio::sync::mpsc;

type TestResult = Result<(), Box<dyn Error>>;

/// The classic layout: build waits for the generator and the admin panel.
fn site_config() -> ConfigFile {
    ConfigFileBuilder::new()
        .with_task("hugo", TaskConfigBuilder::site().build())
        .with_task("cms", TaskConfigBuilder::admin().build())
        .with_task(
            "build",
            TaskConfigBuilder::group().after("hugo").after("cms").build(),
        )
        .build()
}

fn runtime_for(
    cfg: &ConfigFile,
    executor: FakeExecutor,
    rx: mpsc::Receiver<RuntimeEvent>,
) -> Runtime<FakeExecutor> {
    let core = CoreRuntime::new(
        Scheduler::from_config(cfg),
        TriggerWhileRunningBehaviour::Queue,
        1,
        RuntimeOptions {
            exit_when_idle: true,
        },
    );
    Runtime::new(core, rx, executor)
}

async fn trigger(tx: &mpsc::Sender<RuntimeEvent>, task: &str) -> TestResult {
    tx.send(RuntimeEvent::TaskTriggered {
        task: task.to_string(),
        reason: TriggerReason::Manual,
    })
    .await?;
    Ok(())
}

#[tokio::test]
async fn build_runs_generator_and_admin_before_group() -> TestResult {
    init_tracing();

    let cfg = site_config();
    let (tx, rx) = mpsc::channel(16);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let mut runtime = runtime_for(&cfg, FakeExecutor::new(tx.clone(), executed.clone()), rx);

    trigger(&tx, "build").await?;
    with_timeout(runtime.run()).await?;

    let ran = executed.lock().unwrap().clone();
    assert_eq!(ran.len(), 3);
    assert_eq!(ran.last().map(String::as_str), Some("build"));
    assert!(ran.contains(&"hugo".to_string()));
    assert!(ran.contains(&"cms".to_string()));
    assert_eq!(
        runtime.core().run_state_of("build"),
        Some(TaskRunState::DoneSuccess)
    );

    Ok(())
}

#[tokio::test]
async fn generator_failure_never_dispatches_build() -> TestResult {
    init_tracing();

    let cfg = site_config();
    let (tx, rx) = mpsc::channel(16);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(tx.clone(), executed.clone()).failing("hugo");
    let mut runtime = runtime_for(&cfg, executor, rx);

    trigger(&tx, "build").await?;
    with_timeout(runtime.run()).await?;

    let ran = executed.lock().unwrap().clone();
    assert!(!ran.contains(&"build".to_string()));
    assert_eq!(
        runtime.core().run_state_of("build"),
        Some(TaskRunState::DoneFailed)
    );
    // Independent branches still finish.
    assert_eq!(
        runtime.core().run_state_of("cms"),
        Some(TaskRunState::DoneSuccess)
    );

    Ok(())
}

#[tokio::test]
async fn runtime_can_continue_after_first_run() -> TestResult {
    init_tracing();

    let cfg = site_config();
    let (tx, rx) = mpsc::channel(16);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let mut runtime = runtime_for(&cfg, FakeExecutor::new(tx.clone(), executed.clone()), rx);

    trigger(&tx, "build").await?;
    with_timeout(runtime.run()).await?;
    executed.lock().unwrap().clear();

    // A watch trigger for cms alone re-runs only cms.
    tx.send(RuntimeEvent::TaskTriggered {
        task: "cms".to_string(),
        reason: TriggerReason::FileWatch,
    })
    .await?;
    with_timeout(runtime.run()).await?;

    assert_eq!(executed.lock().unwrap().clone(), vec!["cms".to_string()]);
    Ok(())
}

#[tokio::test]
async fn shutdown_stops_watch_mode() -> TestResult {
    init_tracing();

    let cfg = site_config();
    let (tx, rx) = mpsc::channel(16);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let mut runtime = runtime_for(&cfg, FakeExecutor::new(tx.clone(), executed.clone()), rx);
    runtime.core_mut().set_exit_when_idle(false);

    trigger(&tx, "cms").await?;
    tx.send(RuntimeEvent::ShutdownRequested).await?;
    with_timeout(runtime.run()).await?;

    assert!(executed.lock().unwrap().contains(&"cms".to_string()));
    Ok(())
}
