//! Credits command - show the balance and the purchasable top-up plans

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use easel_core::CreditPlan;

use super::{get_context, require_session};
use crate::output;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreditsReport {
    credits: i64,
    is_admin: bool,
    plans: &'static [CreditPlan],
}

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    require_session(&ctx)?;

    let balance = ctx.credit_service.balance()?;
    let plans = ctx.credit_service.plans();

    if json {
        let report = CreditsReport {
            credits: balance.credits,
            is_admin: balance.is_admin,
            plans,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if balance.is_admin {
        println!("Credits: {} (administrator, generations are free)", balance.credits);
    } else {
        println!("Credits: {}", balance.credits);
    }
    println!();

    println!("{}", "Top-up plans".bold());
    let mut table = output::table(&["Plan", "Credits", "Price"]);
    for plan in plans {
        table.add_row(vec![
            plan.plan_id.to_string(),
            plan.credits.to_string(),
            format!("\u{20b9}{}", plan.price),
        ]);
    }
    println!("{}", table);
    println!();
    output::info("Plans are fulfilled manually: an administrator grants the credits after payment.");

    Ok(())
}
