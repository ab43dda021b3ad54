//! Animate command - turn a still image into a short video

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use indicatif::ProgressBar;

use easel_core::LogEvent;

use super::{get_context, get_logger, log_event, require_session};
use crate::output::{info, success};

pub async fn run(image: PathBuf, out: Option<PathBuf>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();
    let session = require_session(&ctx)?;
    let generator = ctx.generator()?;

    // Video generation polls the provider, so this legitimately takes minutes
    let spinner = if json {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_message("Animating image (this can take a few minutes)...");
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    };

    let started = Instant::now();
    let result = ctx
        .studio_service
        .animate(generator.as_ref(), &image, out.as_deref())
        .await;
    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("animation_failed")
                    .with_command("animate")
                    .with_error(e.to_string()),
            );
            return Err(e.into());
        }
    };
    log_event(
        &logger,
        LogEvent::new("animation_completed")
            .with_command("animate")
            .with_duration(started.elapsed().as_millis() as u64),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    success(&format!("Saved video to {}", outcome.path.display()));
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
