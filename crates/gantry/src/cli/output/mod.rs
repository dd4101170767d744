//! Output formatting utilities

mod reporter;

use console::{style, Style};

use gantry_core::ErrorKind;
use gantry_tasks::TaskFailure;

pub use reporter::ConsoleReporter;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    println!("{} {}", style("!").yellow().bold(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", style("→").blue(), message);
}

/// Create a styled header
pub fn header(text: &str) -> String {
    style(text).bold().to_string()
}

/// Create a styled key-value line
pub fn key_value(key: &str, value: &str) -> String {
    format!("  {}: {}", style(key).dim(), value)
}

/// Style for paths
pub fn path_style() -> Style {
    Style::new().cyan()
}

/// Print one failure to stderr: classification, message, file and line
pub fn diagnostic(failure: &TaskFailure) {
    eprintln!("{}", format_diagnostic(failure));
}

fn format_diagnostic(failure: &TaskFailure) -> String {
    let kind = match failure.kind {
        ErrorKind::Compile => style(failure.kind.to_string()).red().bold(),
        ErrorKind::Configuration => style(failure.kind.to_string()).yellow().bold(),
        ErrorKind::Io => style(failure.kind.to_string()).magenta().bold(),
    };

    let mut text = format!(
        "{} {} {}: {}",
        style("✗").red().bold(),
        kind,
        style(&failure.task).bold(),
        failure.message
    );
    if let Some(file) = &failure.file {
        text.push('\n');
        text.push_str(&key_value("file", &path_style().apply_to(file.display()).to_string()));
    }
    if let Some(line) = failure.line {
        text.push('\n');
        text.push_str(&key_value("line", &line.to_string()));
    }
    text
}
