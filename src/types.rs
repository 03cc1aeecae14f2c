use std::fmt;

use serde::Deserialize;

/// Behaviour when a new trigger arrives while a run is already in progress.
///
/// - `Queue`: remember the trigger and start a new run when the current one
///   finishes (default behaviour).
/// - `Cancel`: drop any previously queued run and only keep the latest
///   trigger. The run in progress is never interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TriggerWhileRunningBehaviour {
    #[default]
    Queue,
    Cancel,
}

/// What a task actually does when the scheduler dispatches it.
///
/// Written as `action = "..."` in `[task.<name>]`; tasks without an action
/// are groups that only aggregate their dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskAction {
    /// No work of its own; succeeds once its dependencies have.
    #[default]
    Group,
    /// Invoke the external site generator.
    Site,
    /// Copy the admin panel into the output tree, substituting the repository.
    Admin,
    /// Build the inline icon sprite and inject it into the partial.
    Icons,
    /// Run `cmd` through the platform shell.
    Command,
    /// Start the dev server and watch loop once dependencies are done.
    Serve,
}

impl TaskAction {
    /// Whether a failed run of this action is shown to live-reload clients.
    pub fn reports_failures(self) -> bool {
        !matches!(self, TaskAction::Group | TaskAction::Serve)
    }

    /// Whether a successful run changes the served output and should reload
    /// connected browsers. The icon partial is a generator input, so the
    /// generator run that consumes it sends the reload.
    pub fn reloads_clients(self) -> bool {
        matches!(
            self,
            TaskAction::Site | TaskAction::Admin | TaskAction::Command
        )
    }
}

impl fmt::Display for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskAction::Group => "group",
            TaskAction::Site => "site",
            TaskAction::Admin => "admin",
            TaskAction::Icons => "icons",
            TaskAction::Command => "command",
            TaskAction::Serve => "serve",
        };
        f.write_str(s)
    }
}
