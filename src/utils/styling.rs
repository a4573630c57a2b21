//! Terminal styling utilities for status output

use console::{style, Emoji};
use std::path::Path;

use crate::pipeline::DashboardConfig;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static CALENDAR: Emoji<'_, '_> = Emoji("📅 ", "");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    println!();
    println!("    {}", style("O R D E R L E N S").cyan().bold());
    println!(
        "    {}",
        style("Monthly orders, spend, products and RFM at a glance").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print configuration card
pub fn print_config(input: &Path, config: &DashboardConfig) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Input:      {:<35}│",
        FOLDER,
        truncate_path(input, 34)
    );
    println!(
        "    │  {} Reference:  {:<35}│",
        CALENDAR,
        style(config.rfm.reference.format("%Y-%m-%d").to_string()).yellow()
    );
    println!(
        "    │  {} Bucketing:  {:<35}│",
        CHART,
        style(config.bucketing.to_string()).yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("    {} {}", WARN, style(message).yellow());
}

/// Print the final completion message
pub fn print_completion(message: &str) {
    println!();
    println!("    {} {}", ROCKET, style(message).green().bold());
    println!();
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let tail: String = s
            .chars()
            .rev()
            .take(max_len - 3)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("...{}", tail)
    }
}
