// Copyright (c) 2026 Blockgate Contributors. MIT License.
// See LICENSE for details.

//! # Blockgate Node
//!
//! Entry point for the `blockgate-node` binary. Parses CLI arguments,
//! initializes logging and metrics, starts the queue daemon, and serves the
//! HTTP status API.
//!
//! The binary supports four subcommands:
//!
//! - `run`     — start the admission daemon
//! - `init`    — create a data directory with a default config
//! - `inspect` — print the stored chain tip and queued candidate
//! - `version` — print build version information

mod api;
mod cli;
mod config;
mod logging;
mod metrics;
mod status;
mod updater;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;

use blockgate_protocol::admission::{AdmissionController, ChainLock, QueueDaemon};
use blockgate_protocol::storage::{ChainDb, ChainHeight};

use cli::{BlockgateCli, Commands};
use config::{NodeConfig, CONFIG_FILE_NAME, DB_DIR_NAME};
use logging::LogFormat;
use metrics::NodeMetrics;
use status::StatusTracker;
use updater::DetachedUpdater;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = BlockgateCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Init(args) => init_node(args),
        Commands::Inspect(args) => inspect_store(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the admission daemon, the status API and the metrics endpoint.
///
/// The node only judges candidates; it never enqueues one. Whatever fills
/// the queue slot must share this store, and sled locks the directory for
/// the lifetime of the process. Until such a writer runs in-process, every
/// cycle of a standalone `run` reports `absent`.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    let config = NodeConfig::resolve(&args)?;
    logging::init_logging(
        &format!("{},tower_http=debug", logging::DEFAULT_FILTER),
        LogFormat::from_str_lossy(&config.log_format),
    );
    config.validate().context("invalid node configuration")?;

    tracing::info!(
        node_id = config.node_id,
        data_dir = %config.data_dir.display(),
        rollback_limit = config.rollback_limit,
        honor_nodes = config.honor_nodes.len(),
        "starting blockgate-node"
    );

    let db_path = config.db_path();
    let db = Arc::new(
        ChainDb::open(&db_path)
            .with_context(|| format!("failed to open store at {}", db_path.display()))?,
    );
    if db.get_chain_height()?.is_none() {
        tracing::warn!(
            "no chain tip recorded; admission cycles fail until one is written (see `blockgate-node init`)"
        );
    }

    let node_metrics = Arc::new(NodeMetrics::new().context("failed to register metrics")?);
    let tracker = Arc::new(StatusTracker::new(Arc::clone(&node_metrics)));

    let controller = Arc::new(AdmissionController::new(
        db.clone(),
        db.clone(),
        Arc::new(config.directory()),
        Arc::new(DetachedUpdater::default()),
        ChainLock::new(),
        config.node_id,
    ));

    // --- Queue daemon ---
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let daemon = QueueDaemon::new(Arc::clone(&controller))
        .with_interval(config.queue_check_interval())
        .with_observer(tracker.clone());
    let daemon_task = tokio::spawn(async move { daemon.run(shutdown_rx).await });

    let app_state = api::AppState {
        version: format!(
            "{} (protocol {})",
            env!("CARGO_PKG_VERSION"),
            blockgate_protocol::config::PROTOCOL_VERSION,
        ),
        db: Arc::clone(&db),
        controller,
        status: tracker,
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("0.0.0.0:{}", config.api_port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("status API listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&node_metrics));
    let metrics_addr = format!("0.0.0.0:{}", config.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, stopping queue daemon");
        }
    }

    // The daemon finishes its current cycle before returning.
    let _ = shutdown_tx.send(true);
    if let Err(e) = daemon_task.await {
        tracing::error!("queue daemon task failed: {}", e);
    }
    db.flush().context("failed to flush store")?;

    tracing::info!("blockgate-node stopped");
    Ok(())
}

/// Creates the data directory, writes a default config and records a
/// genesis tip so the daemon has something to compare against.
fn init_node(args: cli::InitArgs) -> Result<()> {
    logging::init_logging(logging::DEFAULT_FILTER, LogFormat::Pretty);

    let data_dir = &args.data_dir;
    tracing::info!(data_dir = %data_dir.display(), node_id = args.node_id, "initializing node");

    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;

    let config_path = data_dir.join(CONFIG_FILE_NAME);
    if config_path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    let config = NodeConfig {
        node_id: args.node_id,
        data_dir: data_dir.clone(),
        ..Default::default()
    };
    std::fs::write(&config_path, config.to_toml_string()?)
        .with_context(|| format!("failed to write {}", config_path.display()))?;

    let db_path = data_dir.join(DB_DIR_NAME);
    let db = ChainDb::open(&db_path)
        .with_context(|| format!("failed to open store at {}", db_path.display()))?;
    let seeded = if db.get_chain_height()?.is_none() {
        db.set_chain_height(&ChainHeight::new(0, Vec::new()))?;
        true
    } else {
        false
    };
    db.flush()?;

    tracing::info!(config = %config_path.display(), seeded, "node initialized");

    println!("Node initialized successfully.");
    println!("  Data directory : {}", data_dir.display());
    println!("  Config         : {}", config_path.display());
    println!("  Node id        : {}", args.node_id);
    if seeded {
        println!("  Chain tip      : 0 (genesis)");
    }

    Ok(())
}

/// Prints the stored chain tip and queued candidate. sled holds an exclusive
/// lock on the directory, so this only works while the node is stopped.
fn inspect_store(args: cli::InspectArgs) -> Result<()> {
    let db_path = args.data_dir.join(DB_DIR_NAME);
    let db = ChainDb::open(&db_path).with_context(|| {
        format!(
            "failed to open store at {} (is the node still running?)",
            db_path.display()
        )
    })?;

    match db.get_chain_height()? {
        Some(tip) => println!("chain tip : {} ({})", tip.block_id, tip.hash_hex()),
        None => println!("chain tip : none"),
    }
    match db.get_candidate()? {
        Some(candidate) if !candidate.is_empty() => println!("queued    : {}", candidate),
        _ => println!("queued    : none"),
    }
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("blockgate-node {}", env!("CARGO_PKG_VERSION"));
    println!("protocol       {}", blockgate_protocol::config::PROTOCOL_VERSION);
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
