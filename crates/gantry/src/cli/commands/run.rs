//! Run command - execute a single task

use clap::Args;
use tracing::info;

use crate::cli::output::success;
use crate::cli::Cli;

use super::{run_task, ProfileArg, Project};

/// Run any registered task
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Task to run (see `gantry tasks`)
    pub task: String,

    /// Profile to run with
    #[arg(long, value_enum, default_value_t = ProfileArg::Development)]
    pub profile: ProfileArg,
}

impl RunCommand {
    /// Execute the run command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(task = %self.task, profile = self.profile.as_str(), "executing run command");
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let project = Project::load(cli)?;
        let orchestrator = project.orchestrator(Some(self.profile), cli)?;

        let outcome = run_task(&orchestrator, &self.task).await?;

        if !cli.quiet {
            success(&format!(
                "{} finished in {:.1}s",
                self.task,
                outcome.duration.as_secs_f64()
            ));
        }
        Ok(())
    }
}
