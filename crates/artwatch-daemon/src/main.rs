// crates/artwatch-daemon/src/main.rs
//
// Binary entrypoint for the artwatch crawler daemon.
//
// Initializes tracing, parses CLI arguments, loads configuration, wires the
// crawler, serves the control endpoint and runs the scheduler until Ctrl-C.

use std::sync::Arc;

use clap::Parser;

use tokio::net::TcpListener;

use artwatch_core::{Artwork, ArtworkStore};
use artwatch_daemon::control;
use artwatch_daemon::{build_crawler, expand_tilde, open_store, ArtworkRegistry, ControlState, DaemonConfig};
use artwatch_store::MemoryStore;

/// artwatch daemon: scans registered artworks for copies on a schedule.
#[derive(Parser, Debug)]
#[command(name = "artwatch-daemon", version = "0.1.0", about = "Artwork similarity crawler daemon")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.artwatch/config.toml")]
    config: String,

    /// Override the data directory from the config file.
    #[arg(long)]
    data_dir: Option<String>,

    /// Use an in-memory store seeded from a JSON artwork list instead of RocksDB.
    #[arg(long, value_name = "ARTWORKS_JSON")]
    dry_run: Option<String>,

    /// Run a single cycle and exit instead of scheduling.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration before tracing so the configured level applies.
    let config_path = expand_tilde(&args.config);
    let (mut daemon_config, load_error) = match DaemonConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (DaemonConfig::default(), Some(e.to_string())),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&daemon_config.log_level)),
        )
        .init();

    match load_error {
        None => tracing::info!("Loaded configuration from {}", config_path),
        Some(e) => tracing::warn!(
            "Could not load config from {}: {}. Using defaults.",
            config_path,
            e
        ),
    }

    daemon_config.apply_env();
    if let Some(data_dir) = args.data_dir {
        daemon_config.data_dir = data_dir;
    }

    tracing::info!("artwatch daemon v0.1.0");
    tracing::info!("Data directory: {}", daemon_config.data_dir);
    tracing::info!(
        "Thresholds: store>={} alert>{} tamper>{}",
        daemon_config.similarity_threshold,
        daemon_config.alert_threshold,
        daemon_config.tamper_similarity_floor
    );
    tracing::info!("Check interval: {}s", daemon_config.check_interval_secs);

    let (store, registry): (Arc<dyn ArtworkStore>, Arc<dyn ArtworkRegistry>) = match &args.dry_run {
        Some(seed_path) => {
            let contents = std::fs::read_to_string(seed_path)?;
            let artworks: Vec<Artwork> = serde_json::from_str(&contents)?;
            tracing::info!(
                "Dry run: in-memory store seeded with {} artworks from {}",
                artworks.len(),
                seed_path
            );
            let memory = Arc::new(MemoryStore::with_artworks(artworks));
            let store: Arc<dyn ArtworkStore> = memory.clone();
            let registry: Arc<dyn ArtworkRegistry> = memory;
            (store, registry)
        }
        None => {
            let rocks = open_store(&daemon_config)?;
            let store: Arc<dyn ArtworkStore> = rocks.clone();
            let registry: Arc<dyn ArtworkRegistry> = rocks;
            (store, registry)
        }
    };

    let crawler = Arc::new(build_crawler(&daemon_config, store)?);

    if args.once {
        let summary = crawler.run_cycle().await;
        tracing::info!(
            "Single cycle done: {} scanned, {} failed, {} findings",
            summary.artworks_scanned,
            summary.artworks_failed,
            summary.findings_stored
        );
        return Ok(());
    }

    let listener = TcpListener::bind(&daemon_config.control_addr)
        .await
        .map_err(|e| format!("Failed to bind control endpoint {}: {}", daemon_config.control_addr, e))?;
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let state = ControlState::new(crawler.clone(), registry);
    let control_server = tokio::spawn(control::serve(listener, state, async move {
        let _ = shutdown_rx.await;
    }));

    let runner = crawler.clone();
    let mut scheduler = tokio::spawn(async move { runner.start().await });

    let outcome = tokio::select! {
        result = &mut scheduler => {
            // The loop only returns on its own if it could not start.
            result
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal");
            crawler.stop();
            scheduler.await
        }
    };

    let _ = shutdown_tx.send(());
    if let Err(e) = control_server.await? {
        tracing::error!("Control endpoint failed: {}", e);
    }
    outcome??;

    tracing::info!("artwatch daemon shut down gracefully");
    Ok(())
}
