//! ABBI CLI: the main entry point.
//!
//! Commands:
//! - `serve`: Start the HTTP server
//! - `route`: Show which provider a model name dispatches to
//! - `memory`: Read or write shared memory through the gateway
//! - `boot-context`: Print the active skill listing
//! - `config`: Show, locate or validate configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "abbi",
    about = "ABBI: context-enriched multi-provider chat gateway",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.abbi/config.toml)
    #[arg(short, long, global = true, env = "ABBI_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,

        /// Override the bind address
        #[arg(long)]
        host: Option<String>,
    },

    /// Show the provider, endpoint and credential source for a model
    Route {
        /// Model identifier, e.g. `gpt-4o` or `claude-sonnet-4-20250514`
        model: String,
    },

    /// Shared memory on the tool gateway
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },

    /// Print the full active-skill listing
    BootContext,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum MemoryAction {
    /// Read recent entries
    Read {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        workstream: Option<String>,
        #[arg(long)]
        source: Option<String>,
    },

    /// Write an entry
    Write {
        #[arg(long)]
        source: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        summary: String,
        #[arg(long)]
        workstream: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration with credentials removed
    Show,
    /// Print the default config file path
    Path,
    /// Load and validate the configuration
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Serve { port, host } => commands::serve::run(config_path, port, host).await?,
        Commands::Route { model } => commands::route::run(config_path, &model)?,
        Commands::Memory { action } => match action {
            MemoryAction::Read {
                limit,
                category,
                workstream,
                source,
            } => {
                let filter = abbi_context::MemoryFilter {
                    limit,
                    category,
                    workstream,
                    source,
                };
                commands::memory::read(config_path, filter).await?
            }
            MemoryAction::Write {
                source,
                category,
                summary,
                workstream,
                priority,
                tags,
            } => {
                let entry = abbi_context::MemoryWrite {
                    source: Some(source),
                    category: Some(category),
                    summary: Some(summary),
                    workstream,
                    priority,
                    tags: (!tags.is_empty()).then_some(tags),
                    details: None,
                };
                commands::memory::write(config_path, entry).await?
            }
        },
        Commands::BootContext => commands::boot_context::run(config_path).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(config_path)?,
            ConfigAction::Path => commands::config_cmd::path(config_path),
            ConfigAction::Validate => commands::config_cmd::validate(config_path)?,
        },
    }

    Ok(())
}
