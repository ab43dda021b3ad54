//! Theme command - show or set the UI theme preference

use anyhow::{anyhow, Result};

use easel_core::Theme;

use super::get_context;
use crate::output;

pub fn run(value: Option<String>) -> Result<()> {
    let ctx = get_context()?;

    match value {
        None => {
            let theme = ctx.repository.theme()?;
            println!("Theme: {}", theme);
        }
        Some(value) => {
            let theme: Theme = value.parse().map_err(|e: String| anyhow!(e))?;
            ctx.repository.set_theme(theme)?;
            output::success(&format!("Theme set to {}.", theme));
        }
    }

    Ok(())
}
