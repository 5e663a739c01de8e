//! # CLI Interface
//!
//! Defines the command-line argument structure for `blockgate-node` using
//! `clap` derive. Supports four subcommands: `run`, `init`, `inspect`, and
//! `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Blockgate queue admission daemon.
///
/// Periodically checks the block queue and decides whether an announced
/// block is pulled from its honor node or discarded.
#[derive(Parser, Debug)]
#[command(
    name = "blockgate-node",
    about = "Blockgate queue admission daemon",
    version,
    propagate_version = true
)]
pub struct BlockgateCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the admission daemon.
    Run(RunArgs),
    /// Initialize a data directory: default config and an empty store.
    Init(InitArgs),
    /// Print the stored chain tip and queued candidate. Stop the node first.
    Inspect(InspectArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand. Flags override the config file.
#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Path to the node configuration file (TOML).
    ///
    /// When omitted, the node looks for `config.toml` in the data directory.
    #[arg(long, short = 'c', env = "BLOCKGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Node data directory.
    #[arg(long, short = 'd', env = "BLOCKGATE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// This node's key id. Candidates announced by it are never pulled.
    #[arg(long, env = "BLOCKGATE_NODE_ID", allow_negative_numbers = true)]
    pub node_id: Option<i64>,

    /// Maximum number of blocks a candidate may be ahead of the local tip.
    #[arg(long, env = "BLOCKGATE_ROLLBACK_LIMIT")]
    pub rollback_limit: Option<u64>,

    /// Port for the HTTP status API.
    #[arg(long, env = "BLOCKGATE_API_PORT")]
    pub api_port: Option<u16>,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "BLOCKGATE_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Log format: "pretty" or "json".
    #[arg(long, env = "BLOCKGATE_LOG_FORMAT")]
    pub log_format: Option<String>,
}

/// Arguments for the `init` subcommand.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Path to the data directory to initialize.
    #[arg(long, short = 'd', env = "BLOCKGATE_DATA_DIR", default_value = "./blockgate-data")]
    pub data_dir: PathBuf,

    /// This node's key id, written into the generated config.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub node_id: i64,

    /// Overwrite an existing config.toml.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `inspect` subcommand.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Data directory holding the store.
    #[arg(long, short = 'd', env = "BLOCKGATE_DATA_DIR", default_value = "./blockgate-data")]
    pub data_dir: PathBuf,
}
