//! Agrinet CLI
//!
//! Main entry point for the agrinet command-line tool.
//! Runs farmer queries through classification, multi-query retrieval and
//! answer generation.

mod commands;

use agrinet_core::{
    config::AppConfig,
    logging::{self, LogFormat},
    AppResult,
};
use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, ClassifyCommand};
use std::path::PathBuf;

/// Agrinet - agricultural advisory with cited, multi-query retrieval
#[derive(Parser, Debug)]
#[command(name = "agrinet")]
#[command(about = "Agricultural advisory with cited, multi-query retrieval", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "AGRINET_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "AGRINET_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider used for answers
    #[arg(short, long, global = true, env = "AGRINET_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "AGRINET_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a single query in a fresh session
    Ask(AskCommand),

    /// Answer queries read line by line from stdin, in one session
    Chat(ChatCommand),

    /// Show how a query would be classified and searched
    Classify(ClassifyCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let config = AppConfig::load()?.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    let log_format = config
        .log_format
        .as_deref()
        .and_then(LogFormat::parse)
        .unwrap_or_default();
    logging::init_logging(config.log_level.as_deref(), config.no_color, log_format)?;

    tracing::info!("Agrinet CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    config.validate()?;

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
        Commands::Classify(_) => "classify",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Classify(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
