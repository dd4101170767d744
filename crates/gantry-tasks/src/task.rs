//! Task types and definitions

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use gantry_core::{Profile, ProfileError, ProfileStore, TransformError};

/// Everything an atomic action needs at execution time
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Profile store; actions read the active profile when they run
    pub profiles: Arc<ProfileStore>,
    /// Directory relative paths are resolved against
    pub root: PathBuf,
}

impl RunContext {
    /// Create a context rooted at the current directory
    pub fn new(profiles: Arc<ProfileStore>) -> Self {
        Self {
            profiles,
            root: PathBuf::from("."),
        }
    }

    /// Set the project root
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// The active profile
    pub fn profile(&self) -> Result<Arc<Profile>, ProfileError> {
        self.profiles.active()
    }

    /// Resolve a path against the project root. Absolute paths are kept.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }
}

/// Unit of work bound to an atomic task
#[async_trait]
pub trait Action: Send + Sync {
    /// One-line description used in execution plans
    fn describe(&self) -> String;

    /// Perform the work
    async fn run(&self, ctx: &RunContext) -> Result<(), TransformError>;
}

/// How a task executes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Runs a single action
    Atomic,
    /// Runs children one after another, stopping at the first failure
    Sequence,
    /// Runs children concurrently and waits for all of them
    Parallel,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Atomic => "atomic",
            Self::Sequence => "seq",
            Self::Parallel => "par",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a task
#[derive(Clone)]
pub enum TaskBody {
    /// A single action
    Atomic(Arc<dyn Action>),
    /// Child task names, run in order
    Sequence(Vec<String>),
    /// Child task names, run concurrently
    Parallel(Vec<String>),
}

impl TaskBody {
    pub fn kind(&self) -> TaskKind {
        match self {
            Self::Atomic(_) => TaskKind::Atomic,
            Self::Sequence(_) => TaskKind::Sequence,
            Self::Parallel(_) => TaskKind::Parallel,
        }
    }

    /// Child task names; empty for atomic tasks
    pub fn children(&self) -> &[String] {
        match self {
            Self::Atomic(_) => &[],
            Self::Sequence(children) | Self::Parallel(children) => children,
        }
    }
}

impl fmt::Debug for TaskBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atomic(action) => f.debug_tuple("Atomic").field(&action.describe()).finish(),
            Self::Sequence(children) => f.debug_tuple("Sequence").field(children).finish(),
            Self::Parallel(children) => f.debug_tuple("Parallel").field(children).finish(),
        }
    }
}

/// A named task registered in a [`TaskGraph`](crate::TaskGraph)
#[derive(Debug, Clone)]
pub struct Task {
    /// Unique task name
    pub name: String,
    /// What the task does
    pub body: TaskBody,
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        self.body.kind()
    }

    pub fn children(&self) -> &[String] {
        self.body.children()
    }
}
