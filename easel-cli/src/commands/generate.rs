//! Generate commands - create images and thumbnails from prompts

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use indicatif::ProgressBar;

use easel_core::{AspectRatio, LogEvent};

use super::{get_context, get_logger, log_event, require_session};
use crate::output::{info, success};

/// Generate a still image
pub async fn run(prompt: &str, ratio: &str, out: Option<PathBuf>, json: bool) -> Result<()> {
    run_job(false, prompt, ratio, out, json).await
}

/// Generate a video thumbnail
pub async fn run_thumbnail(prompt: &str, ratio: &str, out: Option<PathBuf>, json: bool) -> Result<()> {
    run_job(true, prompt, ratio, out, json).await
}

async fn run_job(
    thumbnail: bool,
    prompt: &str,
    ratio: &str,
    out: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let ratio: AspectRatio = ratio.parse().map_err(|e: String| anyhow!(e))?;

    let ctx = get_context()?;
    let logger = get_logger();
    let session = require_session(&ctx)?;
    let generator = ctx.generator()?;

    let (command, what) = if thumbnail {
        ("thumbnail", "thumbnail")
    } else {
        ("generate", "image")
    };

    let spinner = if json {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_message(format!("Generating {} with {}...", what, generator.name()));
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    };

    let started = Instant::now();
    let result = if thumbnail {
        ctx.studio_service
            .generate_thumbnail(generator.as_ref(), prompt, ratio, out.as_deref())
            .await
    } else {
        ctx.studio_service
            .generate_image(generator.as_ref(), prompt, ratio, out.as_deref())
            .await
    };
    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("generation_failed")
                    .with_command(command)
                    .with_error(e.to_string()),
            );
            return Err(e.into());
        }
    };
    log_event(
        &logger,
        LogEvent::new("generation_completed")
            .with_command(command)
            .with_duration(started.elapsed().as_millis() as u64),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    success(&format!("Saved {} to {}", what, outcome.path.display()));
    if session.user.is_admin {
        info("No credits were charged (administrator account).");
    } else {
        info(&format!(
            "{} credits used, {} remaining.",
            outcome.cost, outcome.remaining_credits
        ));
    }
    Ok(())
}
