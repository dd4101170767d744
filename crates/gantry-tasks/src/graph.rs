//! Task graph construction and lookup
//!
//! The graph is a registry from task name to task. A composite task may only
//! name children that are already registered, so every registered graph is
//! acyclic without a separate cycle check.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::task::{Action, Task, TaskBody};

/// Registry of named tasks
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    tasks: HashMap<String, Arc<Task>>,
    /// Registration order
    order: Vec<String>,
}

impl TaskGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task.
    ///
    /// Fails if the name is taken or if a composite task lists a child that
    /// has not been registered yet.
    #[instrument(skip_all, fields(kind = %body.kind()))]
    pub fn register(&mut self, name: impl Into<String>, body: TaskBody) -> Result<(), GraphError> {
        let name = name.into();

        if self.tasks.contains_key(&name) {
            return Err(GraphError::DuplicateTask(name));
        }

        for child in body.children() {
            if !self.tasks.contains_key(child) {
                return Err(GraphError::UnknownChild {
                    parent: name,
                    child: child.clone(),
                });
            }
        }

        debug!(task = %name, children = body.children().len(), "registered task");
        self.order.push(name.clone());
        self.tasks.insert(name.clone(), Arc::new(Task { name, body }));
        Ok(())
    }

    /// Register an atomic task
    pub fn atomic(&mut self, name: &str, action: impl Action + 'static) -> Result<(), GraphError> {
        self.register(name, TaskBody::Atomic(Arc::new(action)))
    }

    /// Register a sequence of existing tasks
    pub fn sequence<I, S>(&mut self, name: &str, children: I) -> Result<(), GraphError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register(
            name,
            TaskBody::Sequence(children.into_iter().map(Into::into).collect()),
        )
    }

    /// Register a parallel group of existing tasks
    pub fn parallel<I, S>(&mut self, name: &str, children: I) -> Result<(), GraphError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register(
            name,
            TaskBody::Parallel(children.into_iter().map(Into::into).collect()),
        )
    }

    /// Look up a task by name
    pub fn resolve(&self, name: &str) -> Result<&Arc<Task>, GraphError> {
        self.tasks
            .get(name)
            .ok_or_else(|| GraphError::UnknownTask(name.to_string()))
    }

    /// Check whether a task is registered
    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Task names in registration order
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Get the total number of tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Render the tree below `root` as an indented plan
    pub fn execution_plan(&self, root: &str) -> Result<String, GraphError> {
        let mut plan = String::new();
        self.render(root, 0, &mut plan)?;
        Ok(plan)
    }

    fn render(&self, name: &str, depth: usize, plan: &mut String) -> Result<(), GraphError> {
        let task = self.resolve(name)?;
        let indent = "  ".repeat(depth);

        match &task.body {
            TaskBody::Atomic(action) => {
                let _ = writeln!(plan, "{}{} -> {}", indent, name, action.describe());
            }
            body => {
                let _ = writeln!(plan, "{}{} [{}]", indent, name, body.kind());
                for child in body.children() {
                    self.render(child, depth + 1, plan)?;
                }
            }
        }

        Ok(())
    }
}

/// Errors during task registration and lookup
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A task with this name already exists
    #[error("Task '{0}' is already registered")]
    DuplicateTask(String),

    /// A composite task names a child that is not registered
    #[error("Task '{parent}' refers to unknown task '{child}'")]
    UnknownChild { parent: String, child: String },

    /// Lookup of a name that was never registered
    #[error("Task '{0}' not found")]
    UnknownTask(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{RunContext, TaskKind};
    use async_trait::async_trait;
    use gantry_core::TransformError;

    struct Echo(&'static str);

    #[async_trait]
    impl Action for Echo {
        fn describe(&self) -> String {
            format!("echo {}", self.0)
        }

        async fn run(&self, _ctx: &RunContext) -> Result<(), TransformError> {
            Ok(())
        }
    }

    fn create_graph() -> TaskGraph {
        let mut graph = TaskGraph::new();
        graph.atomic("clean:css", Echo("css")).unwrap();
        graph.atomic("clean:js", Echo("js")).unwrap();
        graph.parallel("clean", ["clean:css", "clean:js"]).unwrap();
        graph.atomic("sass", Echo("sass")).unwrap();
        graph.sequence("build", ["clean", "sass"]).unwrap();
        graph
    }

    #[test]
    fn test_register_and_resolve() {
        let graph = create_graph();
        assert_eq!(graph.len(), 5);

        let build = graph.resolve("build").unwrap();
        assert_eq!(build.kind(), TaskKind::Sequence);
        assert_eq!(build.children(), ["clean", "sass"]);
        assert_eq!(graph.resolve("clean").unwrap().kind(), TaskKind::Parallel);
    }

    #[test]
    fn test_duplicate_task() {
        let mut graph = create_graph();
        let err = graph.atomic("sass", Echo("again")).unwrap_err();
        assert_eq!(err, GraphError::DuplicateTask("sass".to_string()));
        assert_eq!(graph.len(), 5);
    }

    #[test]
    fn test_unknown_child() {
        let mut graph = TaskGraph::new();
        graph.atomic("sass", Echo("sass")).unwrap();

        let err = graph.parallel("compile", ["sass", "js"]).unwrap_err();
        assert_eq!(
            err,
            GraphError::UnknownChild {
                parent: "compile".to_string(),
                child: "js".to_string(),
            }
        );
        assert!(!graph.contains("compile"));
    }

    #[test]
    fn test_self_reference_is_rejected() {
        let mut graph = TaskGraph::new();
        let err = graph.sequence("loop", ["loop"]).unwrap_err();
        assert!(matches!(err, GraphError::UnknownChild { .. }));
    }

    #[test]
    fn test_resolve_unknown() {
        let graph = create_graph();
        assert_eq!(
            graph.resolve("deploy").unwrap_err(),
            GraphError::UnknownTask("deploy".to_string())
        );
    }

    #[test]
    fn test_names_in_registration_order() {
        let graph = create_graph();
        assert_eq!(
            graph.names(),
            ["clean:css", "clean:js", "clean", "sass", "build"]
        );
    }

    #[test]
    fn test_execution_plan_output() {
        let graph = create_graph();
        let plan = graph.execution_plan("build").unwrap();

        assert_eq!(
            plan,
            "build [seq]\n  clean [par]\n    clean:css -> echo css\n    clean:js -> echo js\n  sass -> echo sass\n"
        );
    }

    #[test]
    fn test_empty_composite() {
        let mut graph = TaskGraph::new();
        graph.parallel("nothing", Vec::<String>::new()).unwrap();
        assert!(graph.resolve("nothing").unwrap().children().is_empty());
    }
}
