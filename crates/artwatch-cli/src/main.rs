// crates/artwatch-cli/src/main.rs
//
// CLI entrypoint for the artwatch operator tools.
//
// Talks to the running artwatch-daemon over its control endpoint: import
// artworks, run on-demand batch scans, list and mark findings, read
// notifications, print reports and stats.

mod commands;
mod output;
mod rpc_client;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use artwatch_daemon::{expand_tilde, DaemonConfig};
use output::OutputFormat;
use rpc_client::DaemonClient;

/// artwatch CLI: operator tools for the artwork similarity crawler.
#[derive(Parser, Debug)]
#[command(name = "artwatch", version = "0.1.0", about = "Operator CLI for the artwatch crawler")]
struct Cli {
    /// Path to the TOML configuration file shared with the daemon.
    #[arg(long, global = true, default_value = "~/.artwatch/config.toml")]
    config: String,

    /// Control endpoint of the daemon (defaults to `control_addr` from the config).
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Import registered artworks from a JSON array.
    Import {
        file: PathBuf,
    },

    /// Scan the given artworks now, with bounded concurrency.
    Scan {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// List stored findings for an owner or an artwork.
    Findings {
        #[arg(long, conflicts_with = "artwork")]
        owner: Option<String>,
        #[arg(long)]
        artwork: Option<String>,
    },

    /// Set a finding's status: pending, read, verified or dismissed.
    Mark {
        finding_id: String,
        status: String,
    },

    /// Notifications the daemon holds for an owner.
    Notifications {
        owner_id: String,
        /// Drop the owner's notifications instead of listing them.
        #[arg(long)]
        clear: bool,
    },

    /// Infringement report for one artwork.
    Report {
        artwork_id: String,
    },

    /// Finding statistics for one owner.
    Stats {
        owner_id: String,
    },

    /// Scheduler state and enabled search backends.
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Quiet by default; scan progress is logged by the daemon.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = DaemonConfig::load(&expand_tilde(&cli.config)).unwrap_or_default();
    config.apply_env();
    let endpoint = cli.endpoint.clone().unwrap_or_else(|| config.control_url());
    let client = DaemonClient::new(endpoint);
    let format = OutputFormat::from_flag(cli.json);

    let output = match &cli.command {
        Commands::Import { file } => commands::import::run(&client, file).await?,
        Commands::Scan { ids } => commands::scan::run(&client, ids, format).await?,
        Commands::Findings { owner, artwork } => {
            commands::findings::run(&client, owner.as_deref(), artwork.as_deref(), format).await?
        }
        Commands::Mark { finding_id, status } => {
            commands::mark::run(&client, finding_id, status).await?
        }
        Commands::Notifications { owner_id, clear } => {
            commands::notifications::run(&client, owner_id, *clear, format).await?
        }
        Commands::Report { artwork_id } => {
            commands::report::run(&client, artwork_id, format).await?
        }
        Commands::Stats { owner_id } => commands::stats::run(&client, owner_id, format).await?,
        Commands::Status => commands::status::run(&client, format).await?,
    };

    println!("{}", output);
    Ok(())
}
