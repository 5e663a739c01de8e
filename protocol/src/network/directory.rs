//! # Honor-Node Directory
//!
//! Network parameters the admission controller needs: how far ahead a
//! candidate may be before we stop chasing it, and where to reach the node
//! that announced it.
//!
//! Honor nodes are configured as `node_id → tcp_address`. Addresses without
//! a port get the network's default TCP port, so `10.0.0.5` and
//! `10.0.0.5:7078` resolve to the same peer.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A resolved `host:port` endpoint for a peer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerAddress(String);

impl PeerAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of the honor-node table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HonorNode {
    /// The node's key id, as carried in queued candidates.
    pub node_id: i64,
    /// Host, optionally with `:port`.
    pub tcp_address: String,
}

/// Errors from resolving a node id to an address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("unknown honor node {0}")]
    UnknownNode(i64),

    #[error("honor node {node_id} has an invalid address {address:?}")]
    InvalidAddress { node_id: i64, address: String },
}

// ---------------------------------------------------------------------------
// NetworkParameters
// ---------------------------------------------------------------------------

/// Source of network-wide parameters for admission.
pub trait NetworkParameters: Send + Sync {
    /// Maximum number of blocks a candidate may be ahead of the local tip.
    fn rollback_limit(&self) -> u64;

    /// Resolve an honor node id to a network address.
    fn resolve_address(&self, node_id: i64) -> Result<PeerAddress, ResolveError>;
}

// ---------------------------------------------------------------------------
// HonorNodeDirectory
// ---------------------------------------------------------------------------

/// [`NetworkParameters`] backed by an in-memory honor-node table.
///
/// The table sits behind a `parking_lot::RwLock` so whoever maintains the
/// peer list can swap it while admission cycles keep reading.
#[derive(Debug)]
pub struct HonorNodeDirectory {
    rollback_limit: u64,
    default_port: u16,
    nodes: RwLock<HashMap<i64, String>>,
}

impl HonorNodeDirectory {
    pub fn new(rollback_limit: u64, default_port: u16) -> Self {
        Self {
            rollback_limit,
            default_port,
            nodes: RwLock::new(HashMap::new()),
        }
    }

    /// Build a directory from a node list. Later duplicates win.
    pub fn with_nodes(
        rollback_limit: u64,
        default_port: u16,
        nodes: impl IntoIterator<Item = HonorNode>,
    ) -> Self {
        let directory = Self::new(rollback_limit, default_port);
        directory.replace_nodes(nodes);
        directory
    }

    /// Swap the whole honor-node table.
    pub fn replace_nodes(&self, nodes: impl IntoIterator<Item = HonorNode>) {
        let table = nodes
            .into_iter()
            .map(|n| (n.node_id, n.tcp_address))
            .collect();
        *self.nodes.write() = table;
    }

    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }
}

impl Default for HonorNodeDirectory {
    fn default() -> Self {
        Self::new(config::DEFAULT_ROLLBACK_LIMIT, config::DEFAULT_TCP_PORT)
    }
}

impl NetworkParameters for HonorNodeDirectory {
    fn rollback_limit(&self) -> u64 {
        self.rollback_limit
    }

    fn resolve_address(&self, node_id: i64) -> Result<PeerAddress, ResolveError> {
        let nodes = self.nodes.read();
        let host = nodes
            .get(&node_id)
            .ok_or(ResolveError::UnknownNode(node_id))?;

        with_default_port(host, self.default_port).ok_or_else(|| ResolveError::InvalidAddress {
            node_id,
            address: host.clone(),
        })
    }
}

/// Append `default_port` to `host` unless it already carries a port.
///
/// Handles bare IPv6 (`::1`) and bracketed IPv6 (`[::1]:9000`). Returns
/// `None` for an empty host or an unparsable port.
pub fn with_default_port(host: &str, default_port: u16) -> Option<PeerAddress> {
    let host = host.trim();
    if host.is_empty() {
        return None;
    }

    if let Some(rest) = host.strip_prefix('[') {
        let (ip, tail) = rest.split_once(']')?;
        if ip.is_empty() {
            return None;
        }
        return match tail {
            "" => Some(PeerAddress(format!("[{}]:{}", ip, default_port))),
            port => {
                let port = port.strip_prefix(':')?.parse::<u16>().ok()?;
                Some(PeerAddress(format!("[{}]:{}", ip, port)))
            }
        };
    }

    match host.matches(':').count() {
        0 => Some(PeerAddress(format!("{}:{}", host, default_port))),
        1 => {
            let (name, port) = host.split_once(':')?;
            if name.is_empty() {
                return None;
            }
            port.parse::<u16>().ok()?;
            Some(PeerAddress(host.to_string()))
        }
        // Unbracketed IPv6 literal; it cannot carry a port.
        _ => Some(PeerAddress(format!("[{}]:{}", host, default_port))),
    }
}
