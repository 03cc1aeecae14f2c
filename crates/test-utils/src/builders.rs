#![allow(dead_code)]

use sitepipe::config::{ConfigFile, RawConfigFile, TaskConfig};
use sitepipe::types::{TaskAction, TriggerWhileRunningBehaviour};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    pub fn with_global_watch(mut self, pattern: &str) -> Self {
        self.config.default.watch.push(pattern.to_string());
        self
    }

    pub fn with_global_exclude(mut self, pattern: &str) -> Self {
        self.config.default.exclude.push(pattern.to_string());
        self
    }

    pub fn with_default_use_hash(mut self, val: bool) -> Self {
        self.config.default.use_hash = Some(val);
        self
    }

    pub fn with_behaviour(mut self, behaviour: TriggerWhileRunningBehaviour) -> Self {
        self.config.config.triggered_while_running_behaviour = behaviour;
        self
    }

    pub fn with_queue_length(mut self, len: usize) -> Self {
        self.config.config.queue_length = len;
        self
    }

    pub fn with_generator(mut self, generator: &str) -> Self {
        self.config.site.generator = generator.to_string();
        self
    }

    /// The unvalidated config, for tests that expect validation to fail.
    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    fn with_action(action: TaskAction) -> Self {
        Self {
            task: TaskConfig {
                action,
                ..TaskConfig::default()
            },
        }
    }

    pub fn group() -> Self {
        Self::with_action(TaskAction::Group)
    }

    pub fn site() -> Self {
        Self::with_action(TaskAction::Site)
    }

    pub fn admin() -> Self {
        Self::with_action(TaskAction::Admin)
    }

    pub fn icons() -> Self {
        Self::with_action(TaskAction::Icons)
    }

    pub fn serve() -> Self {
        Self::with_action(TaskAction::Serve)
    }

    pub fn command(cmd: &str) -> Self {
        let mut builder = Self::with_action(TaskAction::Command);
        builder.task.cmd = Some(cmd.to_string());
        builder
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.after.push(dep.to_string());
        self
    }

    pub fn watch(mut self, pattern: &str) -> Self {
        self.task.watch.get_or_insert_with(Vec::new).push(pattern.to_string());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.task.exclude.get_or_insert_with(Vec::new).push(pattern.to_string());
        self
    }

    pub fn append_default_watch(mut self, val: bool) -> Self {
        self.task.append_default_watch = val;
        self
    }

    pub fn append_default_exclude(mut self, val: bool) -> Self {
        self.task.append_default_exclude = val;
        self
    }

    pub fn use_hash(mut self, val: bool) -> Self {
        self.task.use_hash = Some(val);
        self
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.task.args.push(arg.to_string());
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
