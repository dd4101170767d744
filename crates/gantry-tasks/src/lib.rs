//! Gantry Tasks - Task orchestration engine
//!
//! Named tasks are either atomic actions or sequence/parallel compositions of
//! other tasks. The orchestrator executes a task tree and returns an explicit
//! outcome instead of raising.

pub mod graph;
pub mod orchestrator;
pub mod outcome;
pub mod reporter;
pub mod task;

pub use graph::{GraphError, TaskGraph};
pub use orchestrator::Orchestrator;
pub use outcome::{Outcome, Status, TaskFailure};
pub use reporter::{CollectingReporter, TaskEvent, TaskReporter, TracingReporter};
pub use task::{Action, RunContext, Task, TaskBody, TaskKind};
