//! Watch command

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Args;
use tracing::info;

use gantry_watch::{Subscription, WatchController, WatchRule};

use crate::cli::output::{self, success, warning};
use crate::cli::Cli;
use crate::error::CliError;

use super::{run_task, ProfileArg, Project};

/// Build once, then re-run the tasks a file change affects
#[derive(Debug, Args)]
pub struct WatchCommand {
    /// Profile to build with
    #[arg(long, value_enum, default_value_t = ProfileArg::Development)]
    pub profile: ProfileArg,

    /// Start watching without the initial build
    #[arg(long)]
    pub no_build: bool,
}

impl WatchCommand {
    /// Execute the watch command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(profile = self.profile.as_str(), no_build = self.no_build, "executing watch command");
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let project = Project::load(cli)?;
        let orchestrator = project.orchestrator(Some(self.profile), cli)?;

        let rules = WatchRule::from_config(&project.config.watch.rules)?;
        let mut controller = WatchController::new(orchestrator.clone(), rules)?;

        if !self.no_build {
            match run_task(&orchestrator, "build").await {
                Ok(outcome) => {
                    if !cli.quiet {
                        success(&format!(
                            "Initial build completed in {:.1}s",
                            outcome.duration.as_secs_f64()
                        ));
                    }
                }
                // Keep watching so the broken file can be fixed
                Err(e) if e.is::<CliError>() => warning(&format!("{:#}", e)),
                Err(e) => return Err(e),
            }
        }

        let debounce = Duration::from_millis(project.config.watch.debounce_ms);
        let subscription = Subscription::filesystem(&project.root, controller.rules(), debounce)?;

        if !cli.quiet {
            output::info("Watching for changes, press Ctrl-C to stop");
        }

        let interrupted = AtomicBool::new(false);
        let shutdown = async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => interrupted.store(true, Ordering::SeqCst),
                Err(e) => {
                    tracing::warn!("cannot listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        controller.run(subscription, shutdown).await?;

        if interrupted.load(Ordering::SeqCst) {
            return Err(CliError::Interrupted.into());
        }
        Ok(())
    }
}
