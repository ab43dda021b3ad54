//! Profile command - manage the signed-in account

use anyhow::Result;
use clap::Subcommand;
use dialoguer::Confirm;

use easel_core::services::AccountView;
use easel_core::LogEvent;

use super::{
    format_timestamp, get_context, get_logger, get_password_or_prompt, get_password_with_confirm,
    log_event, require_session,
};
use crate::output;

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show the signed-in account's profile
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change the display name
    SetName {
        /// New display name
        name: String,
    },
    /// Change the password
    ChangePassword {
        /// Current password (prompts if omitted)
        #[arg(long)]
        current: Option<String>,
        /// New password (prompts if omitted)
        #[arg(long)]
        new: Option<String>,
    },
    /// Delete the account and all its data
    Delete {
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

pub fn run(command: ProfileCommands) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();
    let session = require_session(&ctx)?;

    match command {
        ProfileCommands::Show { json } => {
            let user = &session.user;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&AccountView::from_record(user))?
                );
                return Ok(());
            }
            println!("Name:        {}", user.name);
            println!("Email:       {}", user.email);
            println!("Credits:     {}", user.credits);
            println!(
                "Role:        {}",
                if user.is_admin { "administrator" } else { "member" }
            );
            if let Some(created) = user.created_at {
                println!("Joined:      {}", format_timestamp(created));
            }
            println!("Generations: {}", user.history.len());
        }

        ProfileCommands::SetName { name } => {
            let updated = ctx.profile_service.set_name(&name)?;
            log_event(
                &logger,
                LogEvent::new("profile_renamed").with_command("profile set-name"),
            );
            output::success(&format!("Name updated to {}.", updated.name));
        }

        ProfileCommands::ChangePassword { current, new } => {
            let current = get_password_or_prompt(current, "Current password")?;
            let new = get_password_with_confirm(new, "New password (min 8 characters)")?;
            ctx.profile_service.change_password(&current, &new)?;
            log_event(
                &logger,
                LogEvent::new("password_changed").with_command("profile change-password"),
            );
            output::success("Password updated.");
        }

        ProfileCommands::Delete { force } => {
            if !force {
                let confirmed = Confirm::new()
                    .with_prompt("Delete this account and all its data? This cannot be undone.")
                    .default(false)
                    .interact()?;
                if !confirmed {
                    output::info("Cancelled.");
                    return Ok(());
                }
            }

            let email = ctx.profile_service.delete_account()?;
            log_event(
                &logger,
                LogEvent::new("account_deleted").with_command("profile delete"),
            );
            output::success(&format!("Deleted account {}. You are signed out.", email));
        }
    }

    Ok(())
}
