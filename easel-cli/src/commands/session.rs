//! Session commands - signup, login, logout, whoami

use anyhow::Result;

use easel_core::services::{AccountView, Landing};
use easel_core::LogEvent;

use super::{
    format_timestamp, get_context, get_logger, get_password_or_prompt, get_password_with_confirm,
    log_event, require_session,
};
use crate::output::{info, success};

/// Create an account and sign in
pub fn run_signup(name: &str, email: &str, password: Option<String>) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();

    let password = get_password_with_confirm(password, "Choose a password (min 8 characters)")?;

    let session = match ctx.account_service.signup(name, email, &password) {
        Ok(session) => session,
        Err(e) => {
            log_event(&logger, LogEvent::new("signup_failed").with_error(e.to_string()));
            return Err(e.into());
        }
    };
    log_event(&logger, LogEvent::new("signup_completed"));

    success(&format!("Welcome to Easel, {}!", session.user.name));
    info(&format!(
        "Your account starts with {} credits.",
        session.user.credits
    ));
    Ok(())
}

/// Sign in to an existing account
pub fn run_login(email: &str, password: Option<String>) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();

    let password = get_password_or_prompt(password, "Password")?;

    let session = match ctx.account_service.login(email, &password) {
        Ok(session) => session,
        Err(e) => {
            log_event(&logger, LogEvent::new("login_failed").with_error(e.to_string()));
            return Err(e.into());
        }
    };
    log_event(&logger, LogEvent::new("login_completed"));

    success(&format!("Signed in as {}.", session.user.name));
    if session.granted_weekly_topup {
        info("Weekly top-up applied to your balance.");
    }
    if session.landing() == Landing::Admin {
        info("This is an administrator account; 'ez admin' is available.");
    }
    Ok(())
}

/// Sign out of the current session
pub fn run_logout() -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();

    ctx.account_service.logout()?;
    log_event(&logger, LogEvent::new("logout_completed"));

    success("Signed out.");
    Ok(())
}

/// Show the signed-in account
pub fn run_whoami(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let session = require_session(&ctx)?;
    let user = &session.user;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&AccountView::from_record(user))?
        );
        return Ok(());
    }

    println!("Name:    {}", user.name);
    println!("Email:   {}", user.email);
    println!("Credits: {}", user.credits);
    println!(
        "Role:    {}",
        if user.is_admin { "administrator" } else { "member" }
    );
    if let Some(created) = user.created_at {
        println!("Joined:  {}", format_timestamp(created));
    }
    Ok(())
}
