//! CLI commands

mod build;
mod clean;
mod completions;
mod init;
mod run;
mod tasks;
mod watch;

pub use build::BuildCommand;
pub use clean::CleanCommand;
pub use completions::CompletionsCommand;
pub use init::InitCommand;
pub use run::RunCommand;
pub use tasks::TasksCommand;
pub use watch::WatchCommand;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::ValueEnum;
use tracing::info;

use gantry_core::config::{load_config, load_config_or_default, Config};
use gantry_core::{DEVELOPMENT, PRODUCTION};
use gantry_tasks::{Orchestrator, Outcome, RunContext, TaskReporter, TracingReporter};

use crate::cli::output::{self, ConsoleReporter};
use crate::cli::Cli;
use crate::error::CliError;
use crate::pipeline::register_pipeline;

/// Profile selectable on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ProfileArg {
    /// Readable output, comments kept
    #[default]
    Development,
    /// Compressed output
    Production,
}

impl ProfileArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => DEVELOPMENT,
            Self::Production => PRODUCTION,
        }
    }
}

/// Loaded configuration and the directory its paths are relative to
#[derive(Debug)]
pub(crate) struct Project {
    pub config: Config,
    pub root: PathBuf,
}

impl Project {
    /// Load from `--config`, or discover a config file from the working
    /// directory, falling back to the defaults.
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let cwd = std::env::current_dir()?;

        let (config, path) = match &cli.config {
            Some(path) => {
                let config = load_config(path)
                    .with_context(|| format!("Failed to load {}", path.display()))?;
                (config, Some(path.clone()))
            }
            None => load_config_or_default(&cwd).context("Failed to load configuration")?,
        };

        let root = match &path {
            Some(path) => config_root(path, &cwd),
            None => cwd,
        };

        Ok(Self { config, root })
    }

    /// Build the pipeline and an orchestrator over it.
    ///
    /// With `profile` the profile is selected up front; without one only
    /// tasks that never read it can succeed.
    pub fn orchestrator(&self, profile: Option<ProfileArg>, cli: &Cli) -> anyhow::Result<Orchestrator> {
        let graph = register_pipeline(&self.config).context("Invalid pipeline")?;

        let store = self.config.profiles.to_store();
        if let Some(profile) = profile {
            let active = store.set_active(profile.as_str())?;
            info!(profile = %active.name, "profile selected");
        }

        let reporter: Arc<dyn TaskReporter> = if cli.quiet {
            Arc::new(TracingReporter)
        } else {
            Arc::new(ConsoleReporter::new(cli.verbose))
        };

        let context = RunContext::new(Arc::new(store)).with_root(&self.root);
        Ok(Orchestrator::new(graph, context, reporter))
    }
}

/// Directory holding the config file, which all configured paths are
/// relative to
fn config_root(config_path: &Path, cwd: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => cwd.join(parent),
        _ => cwd.to_path_buf(),
    }
}

/// Run `task`, printing a diagnostic for every failure.
pub(crate) async fn run_task(orchestrator: &Orchestrator, task: &str) -> anyhow::Result<Outcome> {
    let outcome = orchestrator.run(task).await?;

    if !outcome.is_success() {
        let failures = outcome.failures();
        eprintln!();
        for failure in failures {
            output::diagnostic(failure);
        }
        return Err(CliError::TaskFailed {
            task: task.to_string(),
            failures: failures.len(),
        }
        .into());
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_root() {
        let cwd = Path::new("/work");
        assert_eq!(config_root(Path::new("gantry.yaml"), cwd), PathBuf::from("/work"));
        assert_eq!(
            config_root(Path::new("site/gantry.toml"), cwd),
            PathBuf::from("/work/site")
        );
        assert_eq!(
            config_root(Path::new("/srv/app/gantry.yaml"), cwd),
            PathBuf::from("/srv/app")
        );
    }

    #[test]
    fn test_profile_names() {
        assert_eq!(ProfileArg::Development.as_str(), "development");
        assert_eq!(ProfileArg::Production.as_str(), "production");
        assert_eq!(ProfileArg::default(), ProfileArg::Development);
    }
}
