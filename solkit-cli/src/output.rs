//! Output formatting utilities

use std::time::Duration;

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value as JsonValue;
use solkit_core::{Cluster, LAMPORTS_PER_SOL};

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg.red());
}

/// Print server-provided error details, pretty-printed and dimmed
pub fn error_details(details: &JsonValue) {
    let text = serde_json::to_string_pretty(details).unwrap_or_else(|_| details.to_string());
    eprintln!("{}", "Details:".dimmed());
    for line in text.lines() {
        eprintln!("  {}", line.dimmed());
    }
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Print a confirmed signature and where to look at it
pub fn signature(cluster: Cluster, signature: &str) {
    println!("  Signature: {}", signature);
    println!("  Explorer:  {}", cluster.explorer_tx_url(signature).underline());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Spinner shown while waiting on the cluster
///
/// Hidden when `quiet` is set so JSON output stays clean.
pub fn spinner(msg: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(msg.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Format lamports as SOL, e.g. `1.5 SOL (1500000000 lamports)`
pub fn format_lamports(lamports: u64) -> String {
    let whole = lamports / LAMPORTS_PER_SOL;
    let frac = lamports % LAMPORTS_PER_SOL;
    let sol = if frac == 0 {
        whole.to_string()
    } else {
        let digits = format!("{:09}", frac);
        format!("{}.{}", whole, digits.trim_end_matches('0'))
    };
    format!("{} SOL ({} lamports)", sol, lamports)
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
