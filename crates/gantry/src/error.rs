//! Errors raised by the CLI itself

use thiserror::Error;

/// Failures detected after a task ran, as opposed to errors that stop it
/// from running at all
#[derive(Debug, Error)]
pub enum CliError {
    /// The task ran and reported failures
    #[error("Task '{task}' failed with {failures} error(s)")]
    TaskFailed { task: String, failures: usize },

    /// The user interrupted a long-running command
    #[error("Interrupted")]
    Interrupted,
}
