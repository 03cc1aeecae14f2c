// src/exec/context.rs

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::model::{AdminSection, ConfigFile, IconsSection, SiteSection};
use crate::fs::FileSystem;
use crate::serve::LiveReloadHub;

/// Everything an action needs besides the scheduled task itself.
///
/// Built once before the first run and shared read-only by every task.
pub struct PipelineContext {
    /// Project root; relative config paths and processes start here.
    pub root: PathBuf,
    pub site: SiteSection,
    pub admin: AdminSection,
    pub icons: IconsSection,
    /// Resolved once per process; `None` leaves the admin placeholder empty.
    pub repository: Option<String>,
    pub fs: Arc<dyn FileSystem>,
    pub hub: LiveReloadHub,
}

impl PipelineContext {
    pub fn from_config(
        cfg: &ConfigFile,
        root: PathBuf,
        repository: Option<String>,
        fs: Arc<dyn FileSystem>,
        hub: LiveReloadHub,
    ) -> Self {
        Self {
            root,
            site: cfg.site().clone(),
            admin: cfg.admin().clone(),
            icons: cfg.icons().clone(),
            repository,
            fs,
            hub,
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.site.output)
    }
}

impl fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineContext")
            .field("root", &self.root)
            .field("repository", &self.repository)
            .finish_non_exhaustive()
    }
}
