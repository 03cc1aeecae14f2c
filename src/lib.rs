// src/lib.rs

pub mod actions;
pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod repository;
pub mod serve;
pub mod types;
pub mod watch;

use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::load_or_builtin;
use crate::config::model::ConfigFile;
use crate::dag::{DagGraph, Scheduler, TaskRunState};
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
use crate::errors::{PipelineError, Result};
use crate::exec::{PipelineContext, RealExecutorBackend};
use crate::fs::{FileSystem, RealFileSystem};
use crate::serve::{open_browser, DevServer, LiveReloadHub};
use crate::types::TaskAction;

/// High-level entry point used by `main.rs`.
///
/// 1. Load the config (or the built-in pipeline) and check the target.
/// 2. Run the target and its dependencies once; fail if any of them fails.
/// 3. For a `serve` target, start the dev server and watcher and keep
///    rebuilding on changes until Ctrl-C.
pub async fn run(args: CliArgs) -> Result<()> {
    let (cfg, root) = load_or_builtin(&args.config, args.icons)?;
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let root = fs.canonicalize(&root).unwrap_or(root);

    let graph = DagGraph::from_config(&cfg);
    let plan = graph.plan_for(&args.target)?;

    if args.dry_run {
        print_dry_run(&cfg, &args.target, &plan);
        return Ok(());
    }

    let repository = if cfg.uses_admin() {
        repository::resolve_from_environment(&cfg.admin().repository_env, &root)
    } else {
        None
    };

    let hub = LiveReloadHub::new();
    let ctx = Arc::new(PipelineContext::from_config(
        &cfg,
        root.clone(),
        repository,
        Arc::clone(&fs),
        hub.clone(),
    ));

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    let executor = RealExecutorBackend::new(rt_tx.clone(), Arc::clone(&ctx));
    spawn_ctrl_c_handler(rt_tx.clone());

    let core = CoreRuntime::new(
        Scheduler::from_config(&cfg),
        cfg.config_section().triggered_while_running_behaviour,
        cfg.config_section().queue_length,
        RuntimeOptions {
            exit_when_idle: true,
        },
    );
    let mut runtime = Runtime::new(core, rt_rx, executor);

    info!(task = %args.target, plan = ?plan, "running target");
    rt_tx
        .send(RuntimeEvent::TaskTriggered {
            task: args.target.clone(),
            reason: TriggerReason::Manual,
        })
        .await
        .map_err(|err| anyhow!("runtime channel closed: {err}"))?;
    runtime.run().await?;

    ensure_target_succeeded(runtime.core(), &args.target)?;

    if graph.action_of(&args.target) != Some(TaskAction::Serve) {
        info!(task = %args.target, "done");
        return Ok(());
    }

    let server = DevServer::bind(cfg.server(), &ctx.output_dir(), hub).await?;
    let url = server.url();
    let profiles = watch::build_profiles_from_config(&cfg)?;
    let _watcher = watch::spawn_watcher(root, profiles, Arc::new(graph), fs, rt_tx.clone())?;
    let mut server_task = tokio::spawn(server.serve());

    info!(url = %url, "serving; watching for changes (Ctrl-C to stop)");
    if cfg.server().open {
        open_browser(&url);
    }

    runtime.core_mut().set_exit_when_idle(false);
    tokio::select! {
        res = runtime.run() => res?,
        res = &mut server_task => {
            res.map_err(|err| anyhow!("dev server task failed: {err}"))??;
        }
    }

    info!("shutting down");
    Ok(())
}

/// Map the target's final run state to the process result.
fn ensure_target_succeeded(core: &CoreRuntime, target: &str) -> Result<()> {
    match core.run_state_of(target) {
        Some(TaskRunState::DoneSuccess) => Ok(()),
        Some(TaskRunState::DoneFailed) => Err(PipelineError::TaskFailed(target.to_string())),
        Some(_) => Err(anyhow!("interrupted before task '{target}' finished").into()),
        None => Err(PipelineError::TaskNotFound(target.to_string())),
    }
}

fn spawn_ctrl_c_handler(tx: mpsc::Sender<RuntimeEvent>) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl-C: {e}");
            return;
        }
        debug!("Ctrl-C received");
        let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
    });
}

/// Print the tasks `target` would run, in dependency order.
fn print_dry_run(cfg: &ConfigFile, target: &str, plan: &[String]) {
    println!("sitepipe dry-run: target '{target}'");
    println!(
        "  config.triggered_while_running_behaviour = {:?}",
        cfg.config_section().triggered_while_running_behaviour
    );
    println!("  config.queue_length = {}", cfg.config_section().queue_length);
    println!(
        "  site: {} {} {} {} {}",
        cfg.site().generator,
        cfg.site().output_flag,
        cfg.site().output,
        cfg.site().source_flag,
        cfg.site().source
    );
    println!();

    println!("plan ({} tasks):", plan.len());
    for (i, name) in plan.iter().enumerate() {
        let Some(task) = cfg.task(name) else {
            continue;
        };
        println!("  {}. {name} [{}]", i + 1, task.action);
        if !task.after.is_empty() {
            println!("      after: {}", task.after.join(", "));
        }
        if let Some(cmd) = &task.cmd {
            println!("      cmd: {cmd}");
        }
        if !task.args.is_empty() {
            println!("      args: {}", task.args.join(" "));
        }
        if let Some(watch) = task.watch.as_ref().filter(|w| !w.is_empty()) {
            println!("      watch: {:?}", watch);
        }
        if let Some(exclude) = task.exclude.as_ref().filter(|e| !e.is_empty()) {
            println!("      exclude: {:?}", exclude);
        }
        if let Some(use_hash) = task.use_hash {
            println!("      use_hash: {use_hash}");
        }
    }

    debug!("dry-run complete (no execution)");
}
