//! promptdeck CLI
//!
//! Main entry point for the promptdeck command-line tool: an LLM playground
//! that runs one question through every selected (model, prompt)
//! combination and compares the answers, with a persistent prompt store.

mod cache;
mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, CacheCommand, PromptsCommand};
use promptdeck_core::{
    config::{AppConfig, PromptBackendKind},
    logging, AppResult,
};
use promptdeck_store::{CustomPromptBackend, FileBackend, PromptStore, RemoteTableBackend};
use std::path::PathBuf;
use std::sync::Arc;

/// promptdeck - compare LLM answers across models and prompt templates
#[derive(Parser, Debug)]
#[command(name = "promptdeck")]
#[command(about = "Run a question through every (model, prompt) combination", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "PROMPTDECK_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Custom-prompt backend (file, remote)
    #[arg(short, long, global = true, env = "PROMPTDECK_PROMPT_BACKEND")]
    backend: Option<String>,

    /// Path to the custom prompts file (file backend)
    #[arg(long, global = true, env = "PROMPTDECK_CUSTOM_PROMPTS_FILE")]
    custom_prompts_file: Option<PathBuf>,

    /// Path to the system prompts file
    #[arg(long, global = true, env = "PROMPTDECK_SYSTEM_PROMPTS")]
    system_prompts: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question across model and prompt combinations
    Ask(AskCommand),

    /// Browse, export, and add prompt templates
    Prompts(PromptsCommand),

    /// Manage the persisted response cache
    Cache(CacheCommand),
}

/// Construct the configured custom-prompt backend.
fn create_backend(config: &AppConfig) -> AppResult<Arc<dyn CustomPromptBackend>> {
    match config.prompt_backend {
        PromptBackendKind::File => Ok(Arc::new(FileBackend::new(&config.custom_prompts_file))),
        PromptBackendKind::Remote => Ok(Arc::new(RemoteTableBackend::new(
            config.supabase_url.clone(),
            config.supabase_key.clone(),
        )?)),
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from environment
    let config = AppConfig::load()?;

    let backend_override = match cli.backend {
        Some(ref value) => Some(value.parse()?),
        None => None,
    };

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        backend_override,
        cli.custom_prompts_file,
        cli.system_prompts,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("promptdeck starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Prompt backend: {}", config.prompt_backend);

    config.ensure_state_dir()?;

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Prompts(_) => "prompts",
        Commands::Cache(_) => "cache",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // The cache command operates on files only; the store (and with it the
    // remote backend's fail-fast construction) is needed for the rest.
    let result = match cli.command {
        Commands::Ask(cmd) => {
            let store = open_store(&config).await?;
            cmd.execute(&config, &store).await
        }
        Commands::Prompts(cmd) => {
            let store = open_store(&config).await?;
            cmd.execute(&store).await
        }
        Commands::Cache(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

async fn open_store(config: &AppConfig) -> AppResult<PromptStore> {
    let backend = create_backend(config)?;
    PromptStore::open(&config.system_prompts_file, backend).await
}
