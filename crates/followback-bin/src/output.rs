//! Output formatting for the CLI.

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

const DIVIDER_WIDTH: usize = 50;

/// Render `value` with `Display` in text mode, as pretty JSON otherwise.
pub fn print<T: Serialize + fmt::Display>(value: &T, format: OutputFormat) {
    let json = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value).ok(),
        OutputFormat::Text => None,
    };
    match json {
        Some(json) => println!("{}", json),
        None => print!("{}", value),
    }
}

fn status_json(status: &str, message: &str) -> String {
    serde_json::json!({ "status": status, "message": message }).to_string()
}

pub fn print_success(message: &str, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", message),
        OutputFormat::Json => println!("{}", status_json("success", message)),
    }
}

/// Errors go to stderr in both formats.
pub fn print_error(message: &str, format: OutputFormat) {
    match format {
        OutputFormat::Text => eprintln!("Error: {}", message),
        OutputFormat::Json => eprintln!("{}", status_json("error", message)),
    }
}

/// `  Label:           value` with the label column padded.
pub fn row(label: &str, value: &str) -> String {
    let label = format!("{}:", label);
    format!("  {:<16} {}\n", label, value)
}

pub fn heading(text: &str) -> String {
    format!("\n{}\n{}\n", text, "-".repeat(DIVIDER_WIDTH))
}
