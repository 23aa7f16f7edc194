//! CLI entry point for the platform importer.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use url::Url;

mod commands;

#[derive(Parser)]
#[command(name = "importer")]
#[command(about = "Declarative resource importer for the platform API")]
#[command(version)]
struct Cli {
    /// Increase log verbosity
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Connection settings shared by the remote subcommands.
#[derive(Debug, clap::Args)]
struct Connection {
    /// Resource API endpoint
    #[arg(long, env = "PLATFORM_API")]
    endpoint: Url,

    /// Bearer token for the resource API
    #[arg(long, env = "PLATFORM_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file without touching the remote platform
    Validate {
        /// Configuration file path
        #[arg(short, long, default_value = "import.yaml")]
        config: PathBuf,
    },

    /// Import a configuration file into the remote platform
    Import {
        /// Configuration file path
        #[arg(short, long, default_value = "import.yaml")]
        config: PathBuf,

        #[command(flatten)]
        connection: Connection,

        /// Default target cluster id applied to every project
        #[arg(long)]
        cluster_id: u32,

        /// Record and skip failed steps instead of aborting on the first
        #[arg(long)]
        keep_going: bool,
    },

    /// Trigger a deployment of a branch environment
    Deploy {
        #[command(flatten)]
        connection: Connection,

        /// Project name
        #[arg(short, long)]
        project: String,

        /// Branch to deploy
        #[arg(short, long)]
        branch: String,
    },

    /// Delete a project environment
    DeleteEnvironment {
        #[command(flatten)]
        connection: Connection,

        /// Project name
        #[arg(short, long)]
        project: String,

        /// Environment name
        #[arg(short, long)]
        environment: String,
    },
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Validate { config } => commands::validate::run(&config),
        Commands::Import {
            config,
            connection,
            cluster_id,
            keep_going,
        } => commands::import::run(&config, connection, cluster_id, keep_going).await,
        Commands::Deploy {
            connection,
            project,
            branch,
        } => commands::environment::deploy(connection, &project, &branch).await,
        Commands::DeleteEnvironment {
            connection,
            project,
            environment,
        } => commands::environment::delete(connection, &project, &environment).await,
    }
}
