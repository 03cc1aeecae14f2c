// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PipelineError, Result};
use crate::types::TaskAction;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = PipelineError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_global_config(cfg)?;
    validate_task_actions(cfg)?;
    validate_task_dependencies(cfg)?;
    validate_dag(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(PipelineError::config("config must contain at least one [task.<name>] section"));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.queue_length == 0 {
        return Err(PipelineError::config("[config].queue_length must be >= 1 (got 0)"));
    }

    if cfg.site.generator.trim().is_empty() {
        return Err(PipelineError::config("[site].generator must not be empty"));
    }

    if cfg.admin.placeholder.is_empty() {
        return Err(PipelineError::config("[admin].placeholder must not be empty"));
    }

    Ok(())
}

fn validate_task_actions(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        let has_cmd = task
            .cmd
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty());

        match task.action {
            TaskAction::Command if !has_cmd => {
                return Err(PipelineError::config(format!(
                    "task '{}' has action \"command\" but no `cmd`",
                    name
                )));
            }
            TaskAction::Command => {}
            other if task.cmd.is_some() => {
                return Err(PipelineError::config(format!(
                    "task '{}' sets `cmd` but its action is \"{}\"",
                    name, other
                )));
            }
            _ => {}
        }

        if !task.args.is_empty() && task.action != TaskAction::Site {
            return Err(PipelineError::config(format!(
                "task '{}' sets `args` but only \"site\" tasks take generator flags",
                name
            )));
        }
    }
    Ok(())
}

fn validate_task_dependencies(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        for dep in task.after.iter() {
            let Some(dep_task) = cfg.task.get(dep) else {
                return Err(PipelineError::config(format!(
                    "task '{}' has unknown dependency '{}' in `after`",
                    name, dep
                )));
            };
            if dep == name {
                return Err(PipelineError::config(format!(
                    "task '{}' cannot depend on itself in `after`",
                    name
                )));
            }
            if dep_task.action == TaskAction::Serve {
                return Err(PipelineError::config(format!(
                    "task '{}' cannot depend on serve task '{}'",
                    name, dep
                )));
            }
        }
    }
    Ok(())
}

fn validate_dag(cfg: &RawConfigFile) -> Result<()> {
    // Edge direction: dep -> task
    // For:
    //   [task.build]
    //   after = ["hugo"]
    // we add edge hugo -> build.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.task.keys() {
        graph.add_node(name.as_str());
    }

    for (name, task) in cfg.task.iter() {
        for dep in task.after.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(PipelineError::DagCycle(format!(
                "cycle detected in task graph involving task '{}'",
                node
            )))
        }
    }
}
