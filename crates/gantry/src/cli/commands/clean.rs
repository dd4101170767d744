//! Clean command

use clap::Args;
use tracing::info;

use crate::cli::output::success;
use crate::cli::Cli;

use super::{run_task, Project};

/// Remove generated assets
#[derive(Debug, Args)]
pub struct CleanCommand {}

impl CleanCommand {
    /// Execute the clean command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing clean command");
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let project = Project::load(cli)?;
        // Cleaning never reads a profile
        let orchestrator = project.orchestrator(None, cli)?;
        run_task(&orchestrator, "clean").await?;

        if !cli.quiet {
            success("Generated assets removed");
        }
        Ok(())
    }
}
