// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::{TaskAction, TriggerWhileRunningBehaviour};

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [site]
/// generator = "hugo"
/// output = "dist"
///
/// [task.hugo]
/// action = "site"
/// watch = ["site/**/*"]
///
/// [task.build]
/// after = ["hugo", "cms"]
/// ```
///
/// All sections are optional and have defaults matching the classic
/// hugo + admin panel layout.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub site: SiteSection,

    #[serde(default)]
    pub admin: AdminSection,

    #[serde(default)]
    pub icons: IconsSection,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub default: DefaultSection,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// A configuration that passed validation (known deps, no cycles, ...).
///
/// Only constructible through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    config: ConfigSection,
    site: SiteSection,
    admin: AdminSection,
    icons: IconsSection,
    server: ServerSection,
    default: DefaultSection,
    task: BTreeMap<String, TaskConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            config: raw.config,
            site: raw.site,
            admin: raw.admin,
            icons: raw.icons,
            server: raw.server,
            default: raw.default,
            task: raw.task,
        }
    }

    pub fn config_section(&self) -> &ConfigSection {
        &self.config
    }

    pub fn site(&self) -> &SiteSection {
        &self.site
    }

    pub fn admin(&self) -> &AdminSection {
        &self.admin
    }

    pub fn icons(&self) -> &IconsSection {
        &self.icons
    }

    pub fn server(&self) -> &ServerSection {
        &self.server
    }

    pub fn default_section(&self) -> &DefaultSection {
        &self.default
    }

    pub fn tasks(&self) -> &BTreeMap<String, TaskConfig> {
        &self.task
    }

    pub fn task(&self, name: &str) -> Option<&TaskConfig> {
        self.task.get(name)
    }

    /// Whether any task needs the repository identifier.
    pub fn uses_admin(&self) -> bool {
        self.task.values().any(|t| t.action == TaskAction::Admin)
    }
}

/// `[config]` section: what happens to triggers that arrive mid-run.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    #[serde(default)]
    pub triggered_while_running_behaviour: TriggerWhileRunningBehaviour,

    /// Maximum number of queued runs to remember.
    #[serde(default = "default_queue_length")]
    pub queue_length: usize,
}

fn default_queue_length() -> usize {
    1
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            triggered_while_running_behaviour: TriggerWhileRunningBehaviour::default(),
            queue_length: default_queue_length(),
        }
    }
}

/// `[site]` section: the external generator and its directories.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Generator binary, looked up on `PATH` when not a path.
    pub generator: String,
    /// Site sources, relative to the project root.
    pub source: String,
    /// Output tree, relative to the project root. Also what the dev server serves.
    pub output: String,
    pub output_flag: String,
    pub source_flag: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            generator: "hugo".to_string(),
            source: "site".to_string(),
            output: "dist".to_string(),
            output_flag: "-d".to_string(),
            source_flag: "-s".to_string(),
        }
    }
}

/// `[admin]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdminSection {
    /// Directory whose files are templated (not recursive).
    pub source: String,
    /// Destination below `site.output`.
    pub dest: String,
    /// Literal token replaced by the repository identifier.
    pub placeholder: String,
    /// Environment variable that overrides `git remote -v`.
    pub repository_env: String,
}

impl Default for AdminSection {
    fn default() -> Self {
        Self {
            source: "src/admin".to_string(),
            dest: "admin".to_string(),
            placeholder: "<% GITHUB_REPOSITORY %>".to_string(),
            repository_env: "REPOSITORY_URL".to_string(),
        }
    }
}

/// `[icons]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IconsSection {
    /// Directory holding the `*.svg` icons.
    pub source: String,
    /// Partial template that receives the sprite.
    pub partial: String,
    pub start_marker: String,
    pub end_marker: String,
    /// Prepended to each file stem to form the symbol id.
    pub id_prefix: String,
}

impl Default for IconsSection {
    fn default() -> Self {
        Self {
            source: "site/static/img/icons".to_string(),
            partial: "site/layouts/partials/svg.html".to_string(),
            start_marker: "<!-- inject:svg -->".to_string(),
            end_marker: "<!-- endinject -->".to_string(),
            id_prefix: String::new(),
        }
    }
}

/// `[server]` section for the dev server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// Open a browser once the server is listening.
    pub open: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            open: false,
        }
    }
}

/// `[default]` section.
///
/// ```toml
/// [default]
/// exclude = ["**/*.swp"]
/// use_hash = true
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DefaultSection {
    /// Default `watch` patterns applied to tasks that do not override them.
    #[serde(default)]
    pub watch: Vec<String>,

    /// Default `exclude` patterns applied to tasks that do not override them.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Default `use_hash` behaviour; if `None`, the global default is `false`.
    #[serde(default)]
    pub use_hash: Option<bool>,
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TaskConfig {
    /// What the task does; `group` when omitted.
    #[serde(default)]
    pub action: TaskAction,

    /// Shell command, required for (and only valid with) `action = "command"`.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Extra generator flags for `action = "site"`, e.g. `["--buildDrafts"]`.
    #[serde(default)]
    pub args: Vec<String>,

    /// Optional task-local watch patterns.
    ///
    /// If `None`, the task uses `default.watch`.
    #[serde(default)]
    pub watch: Option<Vec<String>>,

    /// Optional task-local exclude patterns.
    ///
    /// If `None`, the task uses `default.exclude`.
    #[serde(default)]
    pub exclude: Option<Vec<String>>,

    /// If true, `default.watch` is appended to `task.watch`.
    #[serde(default)]
    pub append_default_watch: bool,

    /// If true, `default.exclude` is appended to `task.exclude`.
    #[serde(default)]
    pub append_default_exclude: bool,

    /// Tasks that must succeed before this one starts.
    #[serde(default)]
    pub after: Vec<String>,

    /// Only re-run on file changes when the watched content hash changed.
    #[serde(default)]
    pub use_hash: Option<bool>,
}

impl TaskConfig {
    /// Convenience: effective `use_hash` given a default from `[default]`.
    pub fn effective_use_hash(&self, default_use_hash: bool) -> bool {
        self.use_hash.unwrap_or(default_use_hash)
    }
}
