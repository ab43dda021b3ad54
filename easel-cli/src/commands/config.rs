//! Config command - API key, models and demo mode

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Password;

use easel_core::config::Config;

use super::get_easel_dir;
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Store the Gemini API key
    SetKey {
        /// The key itself (prompts if omitted)
        key: Option<String>,
    },
    /// Choose the generation models
    SetModel {
        /// Image generation model
        #[arg(long)]
        image: Option<String>,
        /// Chat model
        #[arg(long)]
        chat: Option<String>,
        /// Video generation model
        #[arg(long)]
        video: Option<String>,
    },
    /// Demo mode: canned media, no API key needed
    Demo {
        #[command(subcommand)]
        mode: Option<DemoCommands>,
    },
}

#[derive(Subcommand)]
pub enum DemoCommands {
    /// Enable demo mode
    #[command(name = "on")]
    On,
    /// Disable demo mode
    #[command(name = "off")]
    Off,
    /// Show demo mode status
    Status,
}

pub fn run(command: Option<ConfigCommands>) -> Result<()> {
    let easel_dir = get_easel_dir();
    std::fs::create_dir_all(&easel_dir)?;
    let mut config = Config::load(&easel_dir)?;

    match command.unwrap_or(ConfigCommands::Show) {
        ConfigCommands::Show => {
            println!("Data directory: {}", easel_dir.display());
            match config.masked_key() {
                Some(masked) => println!("API key:        {}", masked),
                None => println!("API key:        not set"),
            }
            println!("Demo mode:      {}", if config.demo_mode { "on" } else { "off" });
            println!("Image model:    {}", config.image_model);
            println!("Chat model:     {}", config.chat_model);
            println!("Video model:    {}", config.video_model);
        }

        ConfigCommands::SetKey { key } => {
            let key = match key {
                Some(k) => k,
                None => Password::new().with_prompt("Gemini API key").interact()?,
            };
            let key = key.trim().to_string();
            if key.is_empty() {
                anyhow::bail!("API key cannot be empty");
            }

            config.api_key = Some(key);
            config.save(&easel_dir)?;
            output::success("API key saved.");
        }

        ConfigCommands::SetModel { image, chat, video } => {
            if image.is_none() && chat.is_none() && video.is_none() {
                anyhow::bail!("Nothing to set. Pass --image, --chat or --video.");
            }

            if let Some(model) = image {
                config.image_model = model;
            }
            if let Some(model) = chat {
                config.chat_model = model;
            }
            if let Some(model) = video {
                config.video_model = model;
            }
            config.save(&easel_dir)?;
            output::success("Models updated.");
        }

        ConfigCommands::Demo { mode } => match mode {
            Some(DemoCommands::On) => {
                config.demo_mode = true;
                config.save(&easel_dir)?;
                output::success("Demo mode enabled");
                println!(
                    "Generations use canned media and demo accounts stay separate from real ones."
                );
            }
            Some(DemoCommands::Off) => {
                config.demo_mode = false;
                config.save(&easel_dir)?;
                println!("{}", "Demo mode disabled".yellow());
            }
            Some(DemoCommands::Status) | None => {
                if config.demo_mode {
                    println!("Demo mode is {}", "ON".green());
                } else {
                    println!("Demo mode is {}", "OFF".yellow());
                }
            }
        },
    }

    Ok(())
}
