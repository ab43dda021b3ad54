//! History command - list past generations, most recent first

use anyhow::Result;

use super::{format_timestamp, get_context, require_session};
use crate::output;

pub fn run(limit: usize, json: bool) -> Result<()> {
    let ctx = get_context()?;
    require_session(&ctx)?;

    let items = ctx.credit_service.history(Some(limit))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        output::info("No generations yet. Try: ez generate \"a calm sea at dusk\"");
        return Ok(());
    }

    let mut table = output::table(&["Time", "Prompt", "Artifact"]);
    for item in &items {
        table.add_row(vec![
            format_timestamp(item.timestamp),
            output::truncate(&item.prompt, 48),
            item.image_url.clone(),
        ]);
    }
    println!("{}", table);

    Ok(())
}
