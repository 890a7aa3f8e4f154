//! Output formatting utilities

use anyhow::{bail, Result};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

use scamguard_core::Outcome;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Spinner on stderr while waiting for the backend
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Print an outcome as JSON and fail the command if it is a failure
pub fn print_json<T: Serialize>(outcome: &Outcome<T>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&outcome.view())?);
    if let Some(message) = outcome.message() {
        bail!("{}", message);
    }
    Ok(())
}

/// Unwrap a successful outcome, or turn its message into the command error
pub fn require<T>(outcome: Outcome<T>) -> Result<T> {
    match outcome {
        Outcome::Success(value) => Ok(value),
        Outcome::Failure { message, .. } => bail!("{}", message),
    }
}

/// Format a 0..1 confidence as a percentage
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.0}%", (confidence * 100.0).clamp(0.0, 100.0))
}
