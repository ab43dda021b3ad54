//! Easel CLI - AI media studio in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{
    admin, animate, chat, config, credits, generate, history, inspire, logs, profile, session,
    theme,
};

/// Easel - AI media studio in your terminal
#[derive(Parser)]
#[command(name = "ez", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and sign in
    Signup {
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

    /// Sign in to an existing account
    Login {
        /// Email address
        email: String,
        /// Password (prompts if omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out
    Logout,

    /// Show the signed-in account
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate an image from a prompt
    Generate {
        /// What to create
        prompt: String,
        /// Aspect ratio: 1:1, 16:9, 9:16, 4:3 or 3:4
        #[arg(long, default_value = "16:9")]
        ratio: String,
        /// Write the image to this path instead of the artifacts directory
        #[arg(long)]
        out: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a video thumbnail from a prompt
    Thumbnail {
        /// What to create
        prompt: String,
        /// Aspect ratio: 1:1, 16:9, 9:16, 4:3 or 3:4
        #[arg(long, default_value = "16:9")]
        ratio: String,
        /// Write the image to this path instead of the artifacts directory
        #[arg(long)]
        out: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Animate an image into a short video
    Animate {
        /// Source image (jpg, png or webp)
        image: PathBuf,
        /// Write the video to this path instead of the artifacts directory
        #[arg(long)]
        out: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Chat with the Easel assistant
    Chat {
        /// Send one message and exit (interactive without it)
        message: Option<String>,
        /// Output as JSON (one-shot only)
        #[arg(long)]
        json: bool,
    },

    /// List past generations
    History {
        /// Number of items to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the credit balance and top-up plans
    Credits {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the signed-in account
    Profile {
        #[command(subcommand)]
        command: profile::ProfileCommands,
    },

    /// Administrator panel
    Admin {
        #[command(subcommand)]
        command: admin::AdminCommands,
    },

    /// Suggest a prompt to get started with
    Inspire {
        /// Suggest a thumbnail prompt instead
        #[arg(long)]
        thumbnails: bool,
    },

    /// Show or set the UI theme
    Theme {
        /// light or dark (shows the current theme if omitted)
        value: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: Option<config::ConfigCommands>,
    },

    /// View and manage the operation log
    Logs {
        #[command(subcommand)]
        command: Option<logs::LogsCommands>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Signup {
            name,
            email,
            password,
        } => session::run_signup(&name, &email, password),
        Commands::Login { email, password } => session::run_login(&email, password),
        Commands::Logout => session::run_logout(),
        Commands::Whoami { json } => session::run_whoami(json),
        Commands::Generate {
            prompt,
            ratio,
            out,
            json,
        } => generate::run(&prompt, &ratio, out, json).await,
        Commands::Thumbnail {
            prompt,
            ratio,
            out,
            json,
        } => generate::run_thumbnail(&prompt, &ratio, out, json).await,
        Commands::Animate { image, out, json } => animate::run(image, out, json).await,
        Commands::Chat { message, json } => chat::run(message, json).await,
        Commands::History { limit, json } => history::run(limit, json),
        Commands::Credits { json } => credits::run(json),
        Commands::Profile { command } => profile::run(command),
        Commands::Admin { command } => admin::run(command),
        Commands::Inspire { thumbnails } => inspire::run(thumbnails),
        Commands::Theme { value } => theme::run(value),
        Commands::Config { command } => config::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}
