//! Tasks command - list the pipeline

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use gantry_tasks::{GraphError, TaskBody, TaskGraph};

use crate::cli::output::header;
use crate::cli::Cli;
use crate::pipeline::register_pipeline;

use super::Project;

/// List tasks, or show the execution plan below one
#[derive(Debug, Args)]
pub struct TasksCommand {
    /// Task whose execution plan to show
    pub root: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// A task and everything below it
#[derive(Debug, Serialize, PartialEq, Eq)]
struct PlanNode {
    name: String,
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<PlanNode>,
}

impl TasksCommand {
    /// Execute the tasks command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(root = ?self.root, "executing tasks command");
        let project = Project::load(cli)?;
        let graph = register_pipeline(&project.config)?;

        match &self.root {
            Some(root) if self.json => {
                println!("{}", serde_json::to_string_pretty(&plan_node(&graph, root)?)?);
            }
            Some(root) => print!("{}", graph.execution_plan(root)?),
            None if self.json => {
                let entries = graph
                    .names()
                    .iter()
                    .map(|name| entry(&graph, name))
                    .collect::<Result<Vec<_>, _>>()?;
                println!("{}", serde_json::to_string_pretty(&entries)?);
            }
            None => {
                if !cli.quiet {
                    println!("{}", header(&format!("{} tasks", graph.len())));
                }
                for name in graph.names() {
                    println!("{}", list_line(&graph, name)?);
                }
            }
        }

        Ok(())
    }
}

/// One task without its subtree, children given by name
fn entry(graph: &TaskGraph, name: &str) -> Result<serde_json::Value, GraphError> {
    let task = graph.resolve(name)?;
    Ok(match &task.body {
        TaskBody::Atomic(action) => serde_json::json!({
            "name": name,
            "kind": task.kind().as_str(),
            "action": action.describe(),
        }),
        body => serde_json::json!({
            "name": name,
            "kind": task.kind().as_str(),
            "children": body.children(),
        }),
    })
}

fn plan_node(graph: &TaskGraph, name: &str) -> Result<PlanNode, GraphError> {
    let task = graph.resolve(name)?;
    let (action, children) = match &task.body {
        TaskBody::Atomic(action) => (Some(action.describe()), Vec::new()),
        body => (
            None,
            body.children()
                .iter()
                .map(|child| plan_node(graph, child))
                .collect::<Result<Vec<_>, _>>()?,
        ),
    };

    Ok(PlanNode {
        name: name.to_string(),
        kind: task.kind().to_string(),
        action,
        children,
    })
}

fn list_line(graph: &TaskGraph, name: &str) -> Result<String, GraphError> {
    let task = graph.resolve(name)?;
    let detail = match &task.body {
        TaskBody::Atomic(action) => action.describe(),
        body => body.children().join(", "),
    };
    Ok(format!(
        "  {:<36} {:<4} {}",
        style(name).bold(),
        style(task.kind()).dim(),
        detail
    ))
}
