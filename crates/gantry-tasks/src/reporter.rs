//! Task execution reporting

use std::sync::Mutex;
use std::time::Duration;

use crate::outcome::TaskFailure;
use crate::task::TaskKind;

/// Events emitted during task execution
#[derive(Debug, Clone)]
pub enum TaskEvent {
    /// A task is starting execution
    Started { name: String, kind: TaskKind },
    /// A task completed successfully
    Completed {
        name: String,
        kind: TaskKind,
        duration: Duration,
    },
    /// A task failed
    Failed {
        name: String,
        kind: TaskKind,
        duration: Duration,
        failures: Vec<TaskFailure>,
    },
    /// A task was never started because an earlier sibling failed
    Skipped { name: String, reason: String },
}

impl TaskEvent {
    /// Name of the task the event is about
    pub fn name(&self) -> &str {
        match self {
            Self::Started { name, .. }
            | Self::Completed { name, .. }
            | Self::Failed { name, .. }
            | Self::Skipped { name, .. } => name,
        }
    }
}

/// Trait for reporting task execution progress
pub trait TaskReporter: Send + Sync {
    /// Handle a task event
    fn report(&self, event: &TaskEvent);
}

/// Simple reporter that logs to tracing
#[derive(Debug, Default)]
pub struct TracingReporter;

impl TaskReporter for TracingReporter {
    fn report(&self, event: &TaskEvent) {
        match event {
            TaskEvent::Started { name, kind } => {
                tracing::info!(task = %name, %kind, "starting");
            }
            TaskEvent::Completed {
                name,
                kind,
                duration,
            } => {
                tracing::info!(
                    task = %name,
                    %kind,
                    "completed in {:.2}s",
                    duration.as_secs_f64()
                );
            }
            TaskEvent::Failed {
                name,
                kind,
                duration,
                failures,
            } => {
                // Composite tasks only relay failures already logged below them
                if *kind == TaskKind::Atomic {
                    for failure in failures {
                        tracing::error!(task = %name, "{}", failure);
                    }
                }
                tracing::error!(
                    task = %name,
                    %kind,
                    failures = failures.len(),
                    "failed after {:.2}s",
                    duration.as_secs_f64()
                );
            }
            TaskEvent::Skipped { name, reason } => {
                tracing::info!(task = %name, "skipped: {}", reason);
            }
        }
    }
}

/// Reporter that collects events for later inspection (useful for testing)
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<TaskEvent>>,
}

impl CollectingReporter {
    /// Get all collected events
    pub fn events(&self) -> Vec<TaskEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Names of tasks that reported `event_name` ("started", "completed",
    /// "failed" or "skipped"), in report order
    pub fn names(&self, event_name: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| {
                matches!(
                    (event_name, e),
                    ("started", TaskEvent::Started { .. })
                        | ("completed", TaskEvent::Completed { .. })
                        | ("failed", TaskEvent::Failed { .. })
                        | ("skipped", TaskEvent::Skipped { .. })
                )
            })
            .map(|e| e.name().to_string())
            .collect()
    }
}

impl TaskReporter for CollectingReporter {
    fn report(&self, event: &TaskEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_reporter() {
        let reporter = CollectingReporter::default();

        reporter.report(&TaskEvent::Started {
            name: "sass".to_string(),
            kind: TaskKind::Atomic,
        });
        reporter.report(&TaskEvent::Completed {
            name: "sass".to_string(),
            kind: TaskKind::Atomic,
            duration: Duration::from_secs(1),
        });
        reporter.report(&TaskEvent::Skipped {
            name: "js".to_string(),
            reason: "sass failed".to_string(),
        });

        assert_eq!(reporter.events().len(), 3);
        assert_eq!(reporter.names("started"), vec!["sass"]);
        assert_eq!(reporter.names("skipped"), vec!["js"]);
        assert!(reporter.names("failed").is_empty());
    }

    #[test]
    fn test_tracing_reporter() {
        let reporter = TracingReporter;

        // Just verify it doesn't panic
        reporter.report(&TaskEvent::Started {
            name: "copy".to_string(),
            kind: TaskKind::Parallel,
        });
        reporter.report(&TaskEvent::Failed {
            name: "sass".to_string(),
            kind: TaskKind::Atomic,
            duration: Duration::from_millis(40),
            failures: vec![TaskFailure::aborted("sass", "boom")],
        });
    }
}
