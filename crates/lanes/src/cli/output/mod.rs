//! Output formatting utilities

use console::{style, Style};
use lanes_core::{ConfigError, Reporter};

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
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

/// Style for option keys
pub fn key_style() -> Style {
    Style::new().cyan()
}

/// Style for environment variable names
pub fn env_style() -> Style {
    Style::new().yellow()
}

/// Print a failed command's error on the matching channel
pub fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<ConfigError>() {
        Some(config_err) if config_err.is_cancelled() => error("Cancelled"),
        Some(config_err) => config_err.report(&ConsoleReporter),
        None => error(&format!("{:#}", err)),
    }
}

/// Reporter that writes to the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn user_error(&self, message: &str) {
        error(message);
    }

    fn fatal(&self, message: &str) {
        error(message);
        eprintln!(
            "  {}",
            style("This is a problem with the action's option declarations, not with your input").dim()
        );
    }

    fn summary(&self, title: &str, rows: &[(String, String)]) {
        println!("{}", header(title));
        let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, value) in rows {
            println!("{}", key_value(&format!("{:width$}", key, width = width), value));
        }
    }
}
