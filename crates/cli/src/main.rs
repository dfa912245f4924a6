//! prompt-enhancer CLI — the main entry point.
//!
//! Commands:
//! - `hook`     — Read a hook request on stdin, print the enhanced prompt (default)
//! - `analyze`  — Print the extracted features and mode decision as JSON
//! - `config`   — Show, locate or validate the configuration

use clap::{Parser, Subcommand};
use enhancer_config::EnhancerConfig;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

#[derive(Parser)]
#[command(
    name = "prompt-enhancer",
    about = "Prompt enhancer — layered enrichment for UserPromptSubmit hooks",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging (to stderr)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Enhance the prompt in the hook request on stdin
    Hook,

    /// Show what the analyzer extracts from a prompt
    Analyze {
        /// Analyze this text instead of reading a hook request from stdin
        #[arg(short, long)]
        prompt: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as JSON
    Show,
    /// Print the config file path
    Path,
    /// Check the config file for errors
    Validate,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // stdout carries the hook payload, so logs go to stderr
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config_path = cli.config.unwrap_or_else(EnhancerConfig::default_path);

    match cli.command.unwrap_or(Commands::Hook) {
        Commands::Hook => return Ok(commands::hook::run(config_path).await),
        Commands::Analyze { prompt } => commands::analyze::run(config_path, prompt).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(&config_path).await?,
            ConfigAction::Path => commands::config_cmd::path(&config_path).await?,
            ConfigAction::Validate => commands::config_cmd::validate(&config_path).await?,
        },
    }

    Ok(ExitCode::SUCCESS)
}
