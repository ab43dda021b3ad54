//! Logs command - view and manage the operation log

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;

use easel_core::{EntryPoint, LoggingService};

use super::{format_timestamp, get_easel_dir};
use crate::output;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent log entries
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete all log entries
    Clear {
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Show log statistics and file path
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn get_logging_service() -> Result<LoggingService> {
    let easel_dir = get_easel_dir();
    let service = LoggingService::new(&easel_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))?;
    Ok(service)
}

pub fn run(command: Option<LogsCommands>) -> Result<()> {
    let command = command.unwrap_or(LogsCommands::List {
        limit: 50,
        json: false,
    });

    match command {
        LogsCommands::List { limit, json } => {
            let service = get_logging_service()?;
            let entries = service.get_recent(limit)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }

            if entries.is_empty() {
                println!("No log entries found.");
                return Ok(());
            }

            let mut table = output::table(&["Time", "Event", "Command", "Duration", "Error"]);
            for entry in &entries {
                let error = entry
                    .error_message
                    .as_deref()
                    .map(|m| output::truncate(m, 40).red().to_string())
                    .unwrap_or_default();

                table.add_row(vec![
                    format_timestamp(entry.timestamp),
                    entry.event.clone(),
                    entry.command.clone().unwrap_or_default(),
                    entry
                        .duration_ms
                        .map(|d| format!("{} ms", d))
                        .unwrap_or_default(),
                    error,
                ]);
            }
            println!("{}", table);
        }

        LogsCommands::Clear { force } => {
            let service = get_logging_service()?;

            if !force {
                let confirmed = Confirm::new()
                    .with_prompt("Delete all log entries?")
                    .default(false)
                    .interact()?;
                if !confirmed {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let deleted = service.clear()?;
            println!("Deleted {} log entries", deleted);
        }

        LogsCommands::Stats { json } => {
            let service = get_logging_service()?;
            let total = service.count()?;
            let errors = service
                .get_recent(total as usize)?
                .iter()
                .filter(|e| e.error_message.is_some())
                .count();
            let log_path = service.log_path().to_path_buf();
            let size_bytes = std::fs::metadata(&log_path).map(|m| m.len()).unwrap_or(0);

            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "total_entries": total,
                        "error_count": errors,
                        "log_path": log_path.to_string_lossy(),
                        "log_size_bytes": size_bytes
                    })
                );
            } else {
                println!("{}", "Log Statistics".bold());
                println!("  Total entries: {}", total);
                println!("  Errors: {}", errors);
                println!("  File: {}", log_path.display());
                println!("  Size: {} bytes", size_bytes);
            }
        }
    }

    Ok(())
}
