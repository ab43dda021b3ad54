//! Admin command - operator panel for member accounts

use anyhow::{anyhow, Result};
use clap::Subcommand;
use dialoguer::Confirm;
use serde::Serialize;

use easel_core::services::{AccountView, SortKey};
use easel_core::LogEvent;

use super::{
    format_timestamp, get_context, get_logger, get_password_with_confirm, log_event,
    require_session,
};
use crate::output;

#[derive(Subcommand)]
pub enum AdminCommands {
    /// List member accounts
    Users {
        /// Sort column: name, email, credits or created
        #[arg(long, default_value = "created")]
        sort: String,
        /// Sort in descending order
        #[arg(long)]
        desc: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add credits to a member account
    Grant {
        /// Member email
        email: String,
        /// Credits to add
        amount: i64,
    },
    /// Remove credits from a member account, stopping at zero
    Revoke {
        /// Member email
        email: String,
        /// Credits to remove
        amount: i64,
    },
    /// Permanently delete a member account
    Delete {
        /// Member email
        email: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// Create or promote an administrator account
    Init {
        /// Display name
        #[arg(long)]
        name: String,
        /// Email address
        #[arg(long)]
        email: String,
        /// Password (prompts if omitted)
        #[arg(long)]
        password: Option<String>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MembersReport {
    total_accounts: usize,
    credits_outstanding: i64,
    members: Vec<AccountView>,
}

pub fn run(command: AdminCommands) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();

    // Init bootstraps the first administrator, so it works signed out
    if !matches!(command, AdminCommands::Init { .. }) {
        require_session(&ctx)?;
    }

    match command {
        AdminCommands::Users { sort, desc, json } => {
            let sort: SortKey = sort.parse().map_err(|e: String| anyhow!(e))?;
            let members = ctx.admin_service.list_members(sort, desc)?;
            let totals = ctx.admin_service.totals()?;

            if json {
                let report = MembersReport {
                    total_accounts: totals.total_accounts,
                    credits_outstanding: totals.credits_outstanding,
                    members: members.iter().map(AccountView::from_record).collect(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            println!(
                "Accounts: {}    Credits outstanding: {}",
                totals.total_accounts, totals.credits_outstanding
            );

            if members.is_empty() {
                output::info("No member accounts yet.");
                return Ok(());
            }

            println!();
            let mut table = output::table(&["Name", "Email", "Credits", "Joined"]);
            for member in &members {
                table.add_row(vec![
                    member.name.clone(),
                    member.email.clone(),
                    member.credits.to_string(),
                    member
                        .created_at
                        .map(format_timestamp)
                        .unwrap_or_else(|| "-".to_string()),
                ]);
            }
            println!("{}", table);
        }

        AdminCommands::Grant { email, amount } => {
            let updated = ctx.admin_service.grant(&email, amount)?;
            log_event(
                &logger,
                LogEvent::new("admin_grant").with_command("admin grant"),
            );
            output::success(&format!(
                "Granted {} credits to {}. New balance: {}.",
                amount, updated.email, updated.credits
            ));
        }

        AdminCommands::Revoke { email, amount } => {
            let updated = ctx.admin_service.revoke(&email, amount)?;
            log_event(
                &logger,
                LogEvent::new("admin_revoke").with_command("admin revoke"),
            );
            output::success(&format!(
                "Revoked {} credits from {}. New balance: {}.",
                amount, updated.email, updated.credits
            ));
        }

        AdminCommands::Delete { email, force } => {
            if !force {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Permanently delete the account {}?", email))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    output::info("Cancelled.");
                    return Ok(());
                }
            }

            ctx.admin_service.delete_member(&email)?;
            log_event(
                &logger,
                LogEvent::new("admin_delete").with_command("admin delete"),
            );
            output::success(&format!("Deleted account {}.", email));
        }

        AdminCommands::Init {
            name,
            email,
            password,
        } => {
            let password = get_password_with_confirm(
                password,
                "Administrator password (min 8 characters)",
            )?;
            let record = ctx.admin_service.provision_admin(&name, &email, &password)?;
            log_event(
                &logger,
                LogEvent::new("admin_provisioned").with_command("admin init"),
            );
            output::success(&format!("Administrator account ready for {}.", record.email));
            output::info("Sign in with 'ez login' to use the admin panel.");
        }
    }

    Ok(())
}
