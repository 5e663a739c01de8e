//! # Node Configuration
//!
//! TOML-backed settings for the daemon. Every key is optional in the file;
//! missing keys fall back to the protocol defaults. CLI flags are applied on
//! top by [`NodeConfig::apply_overrides`].
//!
//! ```toml
//! node_id = 3
//! data_dir = "./blockgate-data"
//! rollback_limit = 60
//!
//! [[honor_nodes]]
//! node_id = 7
//! tcp_address = "10.0.0.5"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use blockgate_protocol::config as protocol;
use blockgate_protocol::network::{HonorNode, HonorNodeDirectory};

use crate::cli::RunArgs;

/// File name `init` writes and `run` looks for inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Name of the sled directory inside the data directory.
pub const DB_DIR_NAME: &str = "db";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// This node's key id. Announcements carrying it are never pulled.
    pub node_id: i64,
    pub data_dir: PathBuf,
    pub rollback_limit: u64,
    /// Port appended to honor-node addresses without one.
    pub default_tcp_port: u16,
    pub queue_check_interval_ms: u64,
    pub api_port: u16,
    pub metrics_port: u16,
    /// "pretty" or "json".
    pub log_format: String,
    pub honor_nodes: Vec<HonorNode>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: 0,
            data_dir: PathBuf::from("./blockgate-data"),
            rollback_limit: protocol::DEFAULT_ROLLBACK_LIMIT,
            default_tcp_port: protocol::DEFAULT_TCP_PORT,
            queue_check_interval_ms: protocol::QUEUE_CHECK_INTERVAL_MS,
            api_port: protocol::DEFAULT_API_PORT,
            metrics_port: protocol::DEFAULT_METRICS_PORT,
            log_format: "pretty".to_string(),
            honor_nodes: Vec::new(),
        }
    }
}

impl NodeConfig {
    /// Read and parse a config file. Does not validate.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Resolve the effective config for `run`: explicit `--config`, else
    /// `config.toml` in the data directory if present, else defaults. CLI
    /// flags win over all of them.
    pub fn resolve(args: &RunArgs) -> anyhow::Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => {
                let data_dir = args
                    .data_dir
                    .clone()
                    .unwrap_or_else(|| Self::default().data_dir);
                let candidate = data_dir.join(CONFIG_FILE_NAME);
                if candidate.exists() {
                    Self::load(&candidate)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(args);
        Ok(config)
    }

    pub fn apply_overrides(&mut self, args: &RunArgs) {
        if let Some(data_dir) = &args.data_dir {
            self.data_dir = data_dir.clone();
        }
        if let Some(node_id) = args.node_id {
            self.node_id = node_id;
        }
        if let Some(limit) = args.rollback_limit {
            self.rollback_limit = limit;
        }
        if let Some(port) = args.api_port {
            self.api_port = port;
        }
        if let Some(port) = args.metrics_port {
            self.metrics_port = port;
        }
        if let Some(format) = &args.log_format {
            self.log_format = format.clone();
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.rollback_limit == 0 {
            bail!("rollback_limit must be greater than zero");
        }
        if self.queue_check_interval_ms == 0 {
            bail!("queue_check_interval_ms must be greater than zero");
        }

        let mut seen = HashSet::new();
        for node in &self.honor_nodes {
            if !seen.insert(node.node_id) {
                bail!("honor node {} is listed more than once", node.node_id);
            }
            if node.tcp_address.trim().is_empty() {
                bail!("honor node {} has an empty tcp_address", node.node_id);
            }
        }
        Ok(())
    }

    pub fn queue_check_interval(&self) -> Duration {
        Duration::from_millis(self.queue_check_interval_ms)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_DIR_NAME)
    }

    /// Honor-node directory built from this config.
    pub fn directory(&self) -> HonorNodeDirectory {
        HonorNodeDirectory::with_nodes(
            self.rollback_limit,
            self.default_tcp_port,
            self.honor_nodes.iter().cloned(),
        )
    }
}
