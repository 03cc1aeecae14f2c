// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::builtin::builtin_pipeline;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Default config file name, looked up in the current working directory.
pub const DEFAULT_CONFIG_FILE: &str = "Sitepipe.toml";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (task graph correctness, etc.). Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for unknown `after` references, cycles, and per-action
///   requirements (see `validate`).
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Load the config at `path`, or fall back to the built-in pipeline when the
/// file does not exist.
///
/// Returns the validated config and the project root: the directory holding
/// the config file, or the current directory for the built-in pipeline.
pub fn load_or_builtin(path: impl AsRef<Path>, icons: bool) -> Result<(ConfigFile, PathBuf)> {
    let path = path.as_ref();

    if path.exists() {
        let cfg = load_and_validate(path)?;
        info!(config = ?path, "loaded pipeline config");
        return Ok((cfg, config_root_dir(path)));
    }

    info!(
        config = ?path,
        icons,
        "config file not found; using built-in pipeline"
    );
    let cfg = ConfigFile::try_from(builtin_pipeline(icons))?;
    let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    Ok((cfg, root))
}

/// Figure out the project root for a config path.
///
/// - If the config path has a non-empty parent (e.g. "web/Sitepipe.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Sitepipe.toml" (parent = ""),
///   we fall back to the current working directory.
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
