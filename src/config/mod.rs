// src/config/mod.rs

//! Configuration loading and validation for sitepipe.
//!
//! - `model.rs`: the TOML-backed data model.
//! - `loader.rs`: reading a config file, or falling back to `builtin.rs`.
//! - `validate.rs`: dependency, action and cycle checks behind
//!   `ConfigFile::try_from`.

pub mod builtin;
pub mod loader;
pub mod model;
pub mod validate;

pub use builtin::builtin_pipeline;
pub use loader::{load_and_validate, load_from_path, load_or_builtin, DEFAULT_CONFIG_FILE};
pub use model::{
    AdminSection, ConfigFile, ConfigSection, DefaultSection, IconsSection, RawConfigFile,
    ServerSection, SiteSection, TaskConfig,
};
