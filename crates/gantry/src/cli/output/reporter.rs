//! Live task progress on the console

use console::style;

use gantry_tasks::{TaskEvent, TaskKind, TaskReporter};

/// Prints atomic task progress. Composite tasks are shown when verbose.
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn shows(&self, kind: TaskKind) -> bool {
        self.verbose || kind == TaskKind::Atomic
    }
}

impl TaskReporter for ConsoleReporter {
    fn report(&self, event: &TaskEvent) {
        match event {
            TaskEvent::Started { name, kind } => {
                if self.verbose {
                    println!(
                        "  {} {} {}",
                        style("▸").dim(),
                        style(name).bold(),
                        style(format!("({})", kind)).dim()
                    );
                }
            }
            TaskEvent::Completed {
                name,
                kind,
                duration,
            } => {
                if self.shows(*kind) {
                    println!(
                        "  {} {} {}",
                        style("✓").green(),
                        style(name).green(),
                        style(format!("{:.1}s", duration.as_secs_f64())).dim()
                    );
                }
            }
            TaskEvent::Failed {
                name,
                kind,
                duration,
                failures,
            } => {
                if self.shows(*kind) {
                    let summary = match (*kind, failures.first()) {
                        (TaskKind::Atomic, Some(failure)) => failure.message.clone(),
                        _ => format!("{} failure(s)", failures.len()),
                    };
                    println!(
                        "  {} {} {} {}",
                        style("✗").red(),
                        style(name).red(),
                        style(format!("{:.1}s", duration.as_secs_f64())).dim(),
                        style(summary).red().dim()
                    );
                }
            }
            TaskEvent::Skipped { name, reason } => {
                println!(
                    "  {} {} {}",
                    style("○").yellow(),
                    style(name).yellow(),
                    style(format!("({})", reason)).dim()
                );
            }
        }
    }
}
