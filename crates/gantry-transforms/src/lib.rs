//! Gantry Transforms - File transforms bound to atomic tasks
//!
//! Each transform is a plain blocking function over paths plus an
//! [`Action`](gantry_tasks::Action) adapter that resolves configured paths
//! against the run context, reads the active profile and runs the work on the
//! blocking thread pool.

pub mod clean;
pub mod copy;
mod fs;
pub mod scripts;
pub mod sourcemap;
pub mod styles;

pub use clean::{clean, CleanAction};
pub use copy::{copy, AssetMapping, CopyAction};
pub use scripts::{compile_scripts, ScriptBundle, ScriptsAction, ScriptsOutput};
pub use styles::{compile_styles, StylesAction, StylesOutput};

use gantry_core::TransformError;

/// Run blocking transform work off the async runtime
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, TransformError>
where
    F: FnOnce() -> Result<T, TransformError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(TransformError::Interrupted(e.to_string())),
    }
}
