//! Toron CLI: a harness around the context pipeline.
//!
//! Commands:
//! - `turn`: Run one user turn (and optionally its reply), print the bundles
//! - `replay`: Feed a transcript through one session, one bundle per action
//! - `config`: Show the effective configuration or the defaults

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use toron_config::{AppConfig, LoggingConfig};

mod commands;
mod transcript;

#[derive(Parser)]
#[command(
    name = "toron",
    about = "Toron: per-turn context orchestration",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Read configuration from this file instead of ~/.toron/config.toml
    #[arg(short, long, global = true, env = "TORON_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a single user message
    Turn {
        /// The raw user message
        #[arg(short, long)]
        message: String,

        /// A model reply to fold back in after the turn
        #[arg(short, long)]
        reply: Option<String>,

        /// Pretty-print the JSON bundles
        #[arg(long)]
        pretty: bool,
    },

    /// Replay a transcript file through one session
    Replay {
        /// Path to the transcript
        transcript: PathBuf,

        /// Pretty-print the JSON bundles
        #[arg(long)]
        pretty: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the default configuration as TOML
    Default,
    /// Print the default config file path
    Path,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_with_env(path)?,
        None => AppConfig::load()?,
    };
    init_tracing(cli.verbose, &config.logging);

    match cli.command {
        Commands::Turn {
            message,
            reply,
            pretty,
        } => commands::turn::run(&config, &message, reply.as_deref(), pretty)?,
        Commands::Replay { transcript, pretty } => {
            commands::replay::run(&config, &transcript, pretty)?
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(&config)?,
            ConfigAction::Default => commands::config_cmd::default(),
            ConfigAction::Path => commands::config_cmd::path(),
        },
    }

    Ok(())
}

/// Logs go to stderr so stdout stays pure JSON.
fn init_tracing(verbose: bool, logging: &LoggingConfig) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
