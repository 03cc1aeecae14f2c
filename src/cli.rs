// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::config::DEFAULT_CONFIG_FILE;

/// Command-line arguments for `sitepipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sitepipe",
    version,
    about = "Build, template and serve a static site through a task graph.",
    long_about = None
)]
pub struct CliArgs {
    /// Task to run, together with everything it depends on.
    ///
    /// The built-in pipeline knows `build`, `build-preview` and `server`.
    #[arg(value_name = "TARGET", default_value = "build")]
    pub target: String,

    /// Path to the config file (TOML).
    ///
    /// When the file does not exist the built-in pipeline is used and the
    /// current directory is the project root.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Add the icon sprite task to the built-in pipeline.
    ///
    /// Ignored when a config file is present.
    #[arg(long)]
    pub icons: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SITEPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the task graph, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
