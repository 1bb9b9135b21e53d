//! CLI Output Formatting Module
//! Provides consistent, colorized output for terminal UX

use colored::Colorize;

use crate::engine::fleet::{EndpointView, NodeView, UpdateError};

pub struct CliFormatter;

impl CliFormatter {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green().bold(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow().bold(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue().bold(), message);
    }

    /// Print a section header
    pub fn header(title: &str) {
        println!("\n{}", title.bright_cyan().bold());
        println!("{}", "─".repeat(title.len()).bright_black());
    }

    /// Print a key-value pair
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", key.bright_white().bold(), value);
    }

    /// Print a table header
    pub fn table_header(columns: &[&str]) {
        let header = columns
            .iter()
            .map(|c| c.bright_white().bold().to_string())
            .collect::<Vec<_>>()
            .join(" │ ");
        println!("  {}", header);
        println!("  {}", "─".repeat(header.len()).bright_black());
    }

    /// Print a table row
    pub fn table_row(values: &[&str]) {
        println!("  {}", values.join(" │ "));
    }

    /// Print a node with its endpoint table
    pub fn node(view: &NodeView) {
        Self::header(&format!("Node {}", view.uuid));
        Self::kv("Version", &view.version);
        Self::kv("OTA channel", &view.ota_channel);
        Self::kv("API host", &view.api_host);
        Self::kv("Last error", &format_last_error(view.last_error));

        if view.endpoints.is_empty() {
            return;
        }
        println!();
        Self::table_header(&["Serial", "Type", "Version", "Battery", "Backlog"]);
        for ep in &view.endpoints {
            Self::table_row(&[
                ep.serial_number.as_str(),
                ep.hardware_type.as_str(),
                ep.version.as_str(),
                ep.battery.as_str(),
                ep.backlog.as_str(),
            ]);
        }
    }

    /// Print a single endpoint
    pub fn endpoint(view: &EndpointView) {
        Self::header(&format!("Endpoint {}", view.serial_number));
        Self::kv("Node", &view.uuid);
        Self::kv("Hardware", &view.hardware_type);
        Self::kv("Version", &view.version);
        Self::kv("Battery", &view.battery);
        Self::kv("Backlog", &view.backlog);
        Self::kv("Last error", &format_last_error(view.last_error));
    }

    /// Print a divider
    pub fn divider() {
        println!("{}", "─".repeat(60).bright_black());
    }
}

/// Error token, or "-" when the last update went through
pub fn format_last_error(error: Option<UpdateError>) -> String {
    error
        .map(|e| e.token().to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_last_error() {
        assert_eq!(format_last_error(None), "-");
        assert_eq!(format_last_error(Some(UpdateError::LowBattery)), "LOW_BATTERY");
    }
}
