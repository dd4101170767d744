//! Watch errors

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while setting up or running watch mode
#[derive(Debug, Error)]
pub enum WatchError {
    /// A rule glob could not be compiled
    #[error("Invalid watch glob '{glob}': {message}")]
    InvalidGlob { glob: String, message: String },

    /// A rule names a task that is not registered
    #[error("Watch rule '{glob}' refers to unknown task '{task}'")]
    UnknownTask { glob: String, task: String },

    /// The project root could not be resolved
    #[error("Cannot watch {}: {source}", path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The filesystem watcher failed
    #[error("Watcher error: {0}")]
    Notify(#[from] notify::Error),
}

impl WatchError {
    /// Whether the error comes from bad configuration rather than the watcher
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidGlob { .. } | Self::UnknownTask { .. })
    }
}
