//! Chat command - talk to the Easel assistant

use std::io::Write as _;

use anyhow::Result;
use colored::Colorize;
use dialoguer::Input;

use easel_core::services::ChatSession;
use easel_core::{LogEvent, LoggingService, MediaGenerator};

use super::{get_context, get_logger, log_event, require_session};
use crate::output::{error, info};

pub async fn run(message: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();
    require_session(&ctx)?;
    let generator = ctx.generator()?;

    let mut chat = ctx.chat_service.session();

    if let Some(message) = message {
        return send_once(&mut chat, generator.as_ref(), &logger, &message, json).await;
    }

    if json {
        anyhow::bail!("--json needs a message: ez chat --json \"...\"");
    }
    if !atty::is(atty::Stream::Stdin) {
        anyhow::bail!("No message given and stdin is not a terminal; pass one: ez chat \"...\"");
    }

    info("Chatting with Easel. Type 'exit' or leave the line empty to quit.");
    loop {
        let line: String = Input::new()
            .with_prompt("you")
            .allow_empty(true)
            .interact_text()?;
        let line = line.trim().to_string();
        if line.is_empty() || line == "exit" || line == "quit" {
            break;
        }

        print!("{} ", "easel:".cyan());
        let _ = std::io::stdout().flush();
        // Keep the conversation going even when one send fails
        if let Err(e) = send_once(&mut chat, generator.as_ref(), &logger, &line, false).await {
            error(&e.to_string());
        }
    }
    Ok(())
}

async fn send_once(
    chat: &mut ChatSession,
    generator: &dyn MediaGenerator,
    logger: &Option<LoggingService>,
    message: &str,
    json: bool,
) -> Result<()> {
    let result = if json {
        chat.send(generator, message, &mut |_| {}).await
    } else {
        chat.send(generator, message, &mut |chunk| {
            print!("{}", chunk);
            let _ = std::io::stdout().flush();
        })
        .await
    };

    match result {
        Ok(reply) => {
            log_event(logger, LogEvent::new("chat_completed").with_command("chat"));
            if json {
                println!("{}", serde_json::to_string_pretty(&reply)?);
            } else {
                println!();
            }
            Ok(())
        }
        Err(e) => {
            log_event(
                logger,
                LogEvent::new("chat_failed")
                    .with_command("chat")
                    .with_error(e.to_string()),
            );
            Err(e.into())
        }
    }
}
