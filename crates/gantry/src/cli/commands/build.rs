//! Build command

use clap::Args;
use tracing::info;

use crate::cli::output::{header, key_value, path_style, success};
use crate::cli::Cli;

use super::{run_task, ProfileArg, Project};

/// Clean, copy and compile every asset
#[derive(Debug, Args)]
pub struct BuildCommand {
    /// Profile to build with
    #[arg(long, value_enum, default_value_t = ProfileArg::Development)]
    pub profile: ProfileArg,
}

impl BuildCommand {
    /// Execute the build command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(profile = self.profile.as_str(), "executing build command");
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let project = Project::load(cli)?;
        let orchestrator = project.orchestrator(Some(self.profile), cli)?;

        if !cli.quiet {
            println!("{}", header("Building assets"));
            println!("{}", key_value("Profile", self.profile.as_str()));
            println!(
                "{}",
                key_value(
                    "Root",
                    &path_style().apply_to(project.root.display()).to_string()
                )
            );
            println!();
        }

        let outcome = run_task(&orchestrator, "build").await?;

        if !cli.quiet {
            println!();
            success(&format!(
                "Build completed in {:.1}s",
                outcome.duration.as_secs_f64()
            ));
        }

        Ok(())
    }
}
