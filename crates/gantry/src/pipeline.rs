//! Declares the asset pipeline from configuration

use gantry_core::config::Config;
use gantry_tasks::{GraphError, TaskGraph};
use gantry_transforms::{CleanAction, CopyAction, ScriptsAction, StylesAction};
use tracing::debug;

/// Register every pipeline task described by `config`.
///
/// Atomic tasks:
/// - `clean:<group>` for each clean group
/// - `copy:<mapping>` for each copy mapping
/// - the styles and scripts tasks, under their configured names
///
/// Composites:
/// - `clean` = par(clean:*)
/// - `copy` = par(copy:*)
/// - `compile:assets` = par(styles, scripts)
/// - `compile` = seq(copy, compile:assets)
/// - `build` = seq(clean, compile)
pub fn register_pipeline(config: &Config) -> Result<TaskGraph, GraphError> {
    let mut graph = TaskGraph::new();

    let mut clean_tasks = Vec::with_capacity(config.clean.len());
    for group in &config.clean {
        let name = format!("clean:{}", group.name);
        graph.atomic(&name, CleanAction::new(group.clone()))?;
        clean_tasks.push(name);
    }
    graph.parallel("clean", clean_tasks)?;

    let mut copy_tasks = Vec::with_capacity(config.copy.len());
    for mapping in &config.copy {
        let name = format!("copy:{}", mapping.name);
        graph.atomic(&name, CopyAction::new(mapping.clone()))?;
        copy_tasks.push(name);
    }
    graph.parallel("copy", copy_tasks)?;

    graph.atomic(&config.styles.task, StylesAction::new(config.styles.clone()))?;
    graph.atomic(&config.scripts.task, ScriptsAction::new(config.scripts.clone()))?;

    graph.parallel(
        "compile:assets",
        [config.styles.task.as_str(), config.scripts.task.as_str()],
    )?;
    graph.sequence("compile", ["copy", "compile:assets"])?;
    graph.sequence("build", ["clean", "compile"])?;

    debug!(tasks = graph.len(), "pipeline registered");
    Ok(graph)
}
