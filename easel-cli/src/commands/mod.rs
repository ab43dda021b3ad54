//! CLI command implementations

pub mod admin;
pub mod animate;
pub mod chat;
pub mod config;
pub mod credits;
pub mod generate;
pub mod history;
pub mod inspire;
pub mod logs;
pub mod profile;
pub mod session;
pub mod theme;

use std::path::PathBuf;

use anyhow::{Context, Result};
use dialoguer::Password;

use easel_core::domain::pricing::WEEKLY_TOPUP;
use easel_core::services::ActiveSession;
use easel_core::{EaselContext, EntryPoint, LogEvent, LoggingService};

use crate::output;

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let easel_dir = get_easel_dir();
    std::fs::create_dir_all(&easel_dir).ok()?;
    LoggingService::new(&easel_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the easel directory from environment or default
pub fn get_easel_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("EASEL_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .expect("Could not find home directory")
            .join(".easel")
    }
}

/// Get or create the easel context
pub fn get_context() -> Result<EaselContext> {
    let easel_dir = get_easel_dir();

    std::fs::create_dir_all(&easel_dir)
        .with_context(|| format!("Failed to create easel directory: {:?}", easel_dir))?;

    EaselContext::new(&easel_dir).context("Failed to initialize easel context")
}

/// Resolve the signed-in session or fail with a pointer to login
///
/// Restoring the session is when the weekly credit grant lands, so this
/// also tells the user when that happened.
pub fn require_session(ctx: &EaselContext) -> Result<ActiveSession> {
    match ctx.account_service.activate()? {
        Some(session) => {
            if session.granted_weekly_topup {
                output::info(&format!(
                    "Weekly top-up: +{} credits added to your balance.",
                    WEEKLY_TOPUP
                ));
            }
            Ok(session)
        }
        None => anyhow::bail!("You are not signed in. Run 'ez login' or 'ez signup' first."),
    }
}

/// Get a password from a --password flag, EASEL_PASSWORD env var, or prompt
pub fn get_password_or_prompt(password_flag: Option<String>, prompt: &str) -> Result<String> {
    if let Some(p) = password_flag {
        return Ok(p);
    }

    if let Ok(p) = std::env::var("EASEL_PASSWORD") {
        return Ok(p);
    }

    let p = Password::new().with_prompt(prompt).interact()?;
    Ok(p)
}

/// Get a password with confirmation, for account creation
pub fn get_password_with_confirm(password_flag: Option<String>, prompt: &str) -> Result<String> {
    if let Some(p) = password_flag {
        return Ok(p);
    }

    if let Ok(p) = std::env::var("EASEL_PASSWORD") {
        return Ok(p);
    }

    let p1 = Password::new().with_prompt(prompt).interact()?;
    let p2 = Password::new().with_prompt("Confirm password").interact()?;

    if p1 != p2 {
        anyhow::bail!("Passwords do not match");
    }
    Ok(p1)
}

/// Format an epoch-ms timestamp for display
pub fn format_timestamp(timestamp_ms: i64) -> String {
    use chrono::{TimeZone, Utc};
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}
