//! Logs command - view and manage the event log

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use solkit_core::services::logging::now_ms;
use solkit_core::LoggingService;

use crate::output;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent log entries
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Show only errors
        #[arg(long)]
        errors: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clear old log entries
    Clear {
        /// Delete logs older than N days
        #[arg(long, default_value = "30")]
        older_than_days: u64,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show log statistics and database path
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn format_timestamp(timestamp_ms: i64) -> String {
    use chrono::{TimeZone, Utc};
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

pub fn run(command: LogsCommands, logger: Option<&LoggingService>) -> Result<()> {
    let service = logger.context("Event log is unavailable (could not open logs.duckdb)")?;

    match command {
        LogsCommands::List { limit, errors, json } => {
            let entries = if errors {
                service.get_errors(limit)?
            } else {
                service.get_recent(limit)?
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }

            if entries.is_empty() {
                println!("No log entries found.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Time", "Event", "Command", "Cluster", "Signature", "Error"]);

            for entry in &entries {
                let error = match &entry.error_message {
                    Some(msg) => msg.red().to_string(),
                    None => String::new(),
                };
                table.add_row(vec![
                    format_timestamp(entry.timestamp),
                    entry.event.clone(),
                    entry.command.clone().unwrap_or_default(),
                    entry.cluster.clone().unwrap_or_default(),
                    entry.signature.clone().unwrap_or_default(),
                    error,
                ]);
            }

            println!("{}", table);
        }
        LogsCommands::Clear {
            older_than_days,
            force,
            json,
        } => {
            let cutoff_ms = now_ms() - (older_than_days as i64 * 24 * 60 * 60 * 1000);

            if !force && !json {
                use dialoguer::Confirm;
                if !Confirm::new()
                    .with_prompt(format!("Delete logs older than {} days?", older_than_days))
                    .default(false)
                    .interact()?
                {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let deleted = service.delete_before(cutoff_ms)?;

            if json {
                println!("{}", serde_json::json!({"deleted": deleted}));
            } else {
                println!("Deleted {} log entries", deleted);
            }
        }
        LogsCommands::Stats { json } => {
            let total = service.count()?;
            let by_event = service.event_counts()?;
            let db_path = service.db_path().to_path_buf();
            let size_bytes = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

            if json {
                let events: serde_json::Map<String, serde_json::Value> = by_event
                    .iter()
                    .map(|(name, n)| (name.clone(), serde_json::json!(n)))
                    .collect();
                println!(
                    "{}",
                    serde_json::json!({
                        "total_entries": total,
                        "events": events,
                        "database_path": db_path.to_string_lossy(),
                        "database_size_bytes": size_bytes
                    })
                );
            } else {
                println!("{}", "Log Statistics".bold());
                println!("  Total entries: {}", total);
                println!("  Database: {}", db_path.display());
                println!("  Size: {}", output::format_size(size_bytes));

                if !by_event.is_empty() {
                    println!();
                    let mut table = output::create_table();
                    table.set_header(vec!["Event", "Count"]);
                    for (name, n) in by_event {
                        table.add_row(vec![name, n.to_string()]);
                    }
                    println!("{}", table);
                }
            }
        }
    }

    Ok(())
}
