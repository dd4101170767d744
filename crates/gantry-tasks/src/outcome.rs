//! Execution outcomes

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use gantry_core::{ErrorKind, TransformError};

/// Structured cause of a failed atomic task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    /// Atomic task that failed
    pub task: String,
    /// Classification
    pub kind: ErrorKind,
    /// Human readable message
    pub message: String,
    /// Originating file, if known
    pub file: Option<PathBuf>,
    /// Line in `file`, if known
    pub line: Option<usize>,
}

impl TaskFailure {
    /// Build a failure from a transform error
    pub fn from_error(task: impl Into<String>, error: &TransformError) -> Self {
        Self {
            task: task.into(),
            kind: error.kind(),
            message: error.to_string(),
            file: error.file().map(PathBuf::from),
            line: error.line(),
        }
    }

    /// A child task that could not be started
    pub fn aborted(task: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            kind: ErrorKind::Configuration,
            message: message.into(),
            file: None,
            line: None,
        }
    }

    /// A task whose body panicked while running
    pub fn panicked(task: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            kind: ErrorKind::Io,
            message: format!("Task panicked: {}", message.into()),
            file: None,
            line: None,
        }
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.task, self.message)?;
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, " ({}:{})", file.display(), line),
            (Some(file), None) => write!(f, " ({})", file.display()),
            _ => Ok(()),
        }
    }
}

/// Result status of running a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// The task and everything below it succeeded
    Success,
    /// One or more atomic tasks failed, in the order they were declared
    Failure(Vec<TaskFailure>),
}

impl Status {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Outcome of running a task
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Task that was run
    pub task: String,
    /// Success or the collected failures
    pub status: Status,
    /// Wall-clock time spent
    pub duration: Duration,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// All failures; empty on success
    pub fn failures(&self) -> &[TaskFailure] {
        match &self.status {
            Status::Success => &[],
            Status::Failure(failures) => failures,
        }
    }

    /// The first failure encountered, if any
    pub fn first_failure(&self) -> Option<&TaskFailure> {
        self.failures().first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_from_compile_error() {
        let err = TransformError::compile("scss/app.scss", Some(12), "expected \";\".");
        let failure = TaskFailure::from_error("sass", &err);

        assert_eq!(failure.kind, ErrorKind::Compile);
        assert_eq!(failure.file, Some(PathBuf::from("scss/app.scss")));
        assert_eq!(failure.line, Some(12));
        assert_eq!(
            failure.to_string(),
            "[compile] sass: expected \";\". (scss/app.scss:12)"
        );
    }

    #[test]
    fn test_panicked_is_a_runtime_failure() {
        let failure = TaskFailure::panicked("js", "kaboom");
        assert_eq!(failure.kind, ErrorKind::Io);
        assert_eq!(failure.to_string(), "[io] js: Task panicked: kaboom");
    }

    #[test]
    fn test_outcome_failures() {
        let outcome = Outcome {
            task: "build".to_string(),
            status: Status::Failure(vec![
                TaskFailure::aborted("a", "first"),
                TaskFailure::aborted("b", "second"),
            ]),
            duration: Duration::ZERO,
        };

        assert!(!outcome.is_success());
        assert_eq!(outcome.failures().len(), 2);
        assert_eq!(outcome.first_failure().unwrap().task, "a");
    }

    #[test]
    fn test_success_has_no_failures() {
        let outcome = Outcome {
            task: "build".to_string(),
            status: Status::Success,
            duration: Duration::from_millis(5),
        };
        assert!(outcome.is_success());
        assert!(outcome.first_failure().is_none());
    }
}
