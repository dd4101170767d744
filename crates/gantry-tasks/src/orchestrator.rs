//! Orchestrator — executes a task tree using tokio

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinError;
use tracing::{debug, instrument, warn};

use crate::graph::{GraphError, TaskGraph};
use crate::outcome::{Outcome, Status, TaskFailure};
use crate::reporter::{TaskEvent, TaskReporter};
use crate::task::{Action, RunContext, Task, TaskBody, TaskKind};

type OutcomeFuture = Pin<Box<dyn Future<Output = Outcome> + Send + 'static>>;

/// Runs named tasks from a [`TaskGraph`]
///
/// Cloning is cheap; clones share the graph, context and reporter.
#[derive(Clone)]
pub struct Orchestrator {
    graph: Arc<TaskGraph>,
    context: RunContext,
    reporter: Arc<dyn TaskReporter>,
}

impl Orchestrator {
    /// Create a new orchestrator
    pub fn new(graph: TaskGraph, context: RunContext, reporter: Arc<dyn TaskReporter>) -> Self {
        Self {
            graph: Arc::new(graph),
            context,
            reporter,
        }
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Run the named task and everything below it.
    ///
    /// An unknown name is returned as an error before anything executes.
    /// Transform failures are carried inside the returned [`Outcome`].
    #[instrument(skip(self))]
    pub async fn run(&self, name: &str) -> Result<Outcome, GraphError> {
        let task = Arc::clone(self.graph.resolve(name)?);
        Ok(self.execute(task).await)
    }

    fn execute(&self, task: Arc<Task>) -> OutcomeFuture {
        let this = self.clone();
        Box::pin(async move { this.execute_task(task).await })
    }

    async fn execute_task(self, task: Arc<Task>) -> Outcome {
        let start = Instant::now();
        let kind = task.kind();

        self.reporter.report(&TaskEvent::Started {
            name: task.name.clone(),
            kind,
        });

        let status = match &task.body {
            TaskBody::Atomic(action) => self.run_atomic(&task.name, Arc::clone(action)).await,
            TaskBody::Sequence(children) => self.run_sequence(&task.name, children).await,
            TaskBody::Parallel(children) => self.run_parallel(children).await,
        };

        let duration = start.elapsed();
        self.report_finished(&task.name, kind, duration, &status);

        Outcome {
            task: task.name.clone(),
            status,
            duration,
        }
    }

    /// Run an action on its own tokio task so a panic in it fails only this task
    async fn run_atomic(&self, name: &str, action: Arc<dyn Action>) -> Status {
        let context = self.context.clone();
        let handle = tokio::spawn(async move { action.run(&context).await });

        match handle.await {
            Ok(Ok(())) => Status::Success,
            Ok(Err(e)) => Status::Failure(vec![TaskFailure::from_error(name, &e)]),
            Err(e) => {
                let message = panic_message(e);
                warn!(task = %name, "task panicked: {}", message);
                Status::Failure(vec![TaskFailure::panicked(name, message)])
            }
        }
    }

    async fn run_sequence(&self, parent: &str, children: &[String]) -> Status {
        for (idx, child) in children.iter().enumerate() {
            let task = match self.child(child) {
                Ok(task) => task,
                Err(failure) => return Status::Failure(vec![failure]),
            };

            let outcome = self.execute(task).await;
            if let Status::Failure(failures) = outcome.status {
                for rest in &children[idx + 1..] {
                    self.reporter.report(&TaskEvent::Skipped {
                        name: rest.clone(),
                        reason: format!("'{}' failed in '{}'", child, parent),
                    });
                }
                return Status::Failure(failures);
            }
        }

        Status::Success
    }

    async fn run_parallel(&self, children: &[String]) -> Status {
        let mut handles = Vec::with_capacity(children.len());

        for child in children {
            match self.child(child) {
                Ok(task) => handles.push((child, Some(tokio::spawn(self.execute(task))))),
                Err(failure) => {
                    debug!(task = %child, "not spawned: {}", failure);
                    handles.push((child, None));
                }
            }
        }

        let mut failures = Vec::new();
        for (child, handle) in handles {
            let Some(handle) = handle else {
                failures.push(TaskFailure::aborted(
                    child.as_str(),
                    format!("Task '{}' not found", child),
                ));
                continue;
            };

            match handle.await {
                Ok(outcome) => {
                    if let Status::Failure(child_failures) = outcome.status {
                        failures.extend(child_failures);
                    }
                }
                Err(e) => {
                    failures.push(TaskFailure::panicked(child.as_str(), panic_message(e)));
                }
            }
        }

        if failures.is_empty() {
            Status::Success
        } else {
            Status::Failure(failures)
        }
    }

    fn child(&self, name: &str) -> Result<Arc<Task>, TaskFailure> {
        self.graph
            .resolve(name)
            .map(Arc::clone)
            .map_err(|e| TaskFailure::aborted(name, e.to_string()))
    }

    fn report_finished(&self, name: &str, kind: TaskKind, duration: Duration, status: &Status) {
        let event = match status {
            Status::Success => TaskEvent::Completed {
                name: name.to_string(),
                kind,
                duration,
            },
            Status::Failure(failures) => TaskEvent::Failed {
                name: name.to_string(),
                kind,
                duration,
                failures: failures.clone(),
            },
        };
        self.reporter.report(&event);
    }
}

fn panic_message(error: JoinError) -> String {
    match error.try_into_panic() {
        Ok(payload) => {
            if let Some(message) = payload.downcast_ref::<&str>() {
                message.to_string()
            } else if let Some(message) = payload.downcast_ref::<String>() {
                message.clone()
            } else {
                "unknown panic payload".to_string()
            }
        }
        Err(e) => e.to_string(),
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("graph", &self.graph)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
