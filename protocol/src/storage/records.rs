//! # Stored Records
//!
//! The two records the admission controller reads on every cycle.
//!
//! ```text
//! ┌──────────────────────────────┐   ┌──────────────────────────────┐
//! │  ChainHeight (info block)    │   │  SyncCandidate (queue block) │
//! │  ├── block_id: u64           │   │  ├── block_id: u64           │
//! │  └── block_hash: Vec<u8>     │   │  ├── block_hash: Vec<u8>     │
//! └──────────────────────────────┘   │  └── origin_node_id: i64     │
//!                                    └──────────────────────────────┘
//! ```
//!
//! Hashes are opaque byte strings. The controller never recomputes them;
//! it only compares and deletes by them.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ChainHeight
// ---------------------------------------------------------------------------

/// The highest block this node has durably applied.
///
/// Written by the block-application pipeline, read-only to admission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainHeight {
    /// Height of the local tip.
    pub block_id: u64,
    /// Hash of the local tip.
    pub block_hash: Vec<u8>,
}

impl ChainHeight {
    pub fn new(block_id: u64, block_hash: impl Into<Vec<u8>>) -> Self {
        Self {
            block_id,
            block_hash: block_hash.into(),
        }
    }

    /// Return the tip hash as a hex string.
    pub fn hash_hex(&self) -> String {
        hex::encode(&self.block_hash)
    }
}

// ---------------------------------------------------------------------------
// SyncCandidate
// ---------------------------------------------------------------------------

/// A block announced by an honor node that we have not yet pulled.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCandidate {
    /// Height of the announced block.
    pub block_id: u64,
    /// Hash of the announced block. Empty means "no candidate".
    pub block_hash: Vec<u8>,
    /// Node id of the honor node that produced the block.
    pub origin_node_id: i64,
}

impl SyncCandidate {
    pub fn new(block_id: u64, block_hash: impl Into<Vec<u8>>, origin_node_id: i64) -> Self {
        Self {
            block_id,
            block_hash: block_hash.into(),
            origin_node_id,
        }
    }

    /// A candidate with no hash is a placeholder row, not an announcement.
    pub fn is_empty(&self) -> bool {
        self.block_hash.is_empty()
    }

    /// Return the announced hash as a hex string.
    pub fn hash_hex(&self) -> String {
        hex::encode(&self.block_hash)
    }
}

impl fmt::Display for SyncCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "block {} ({}) from node {}",
            self.block_id,
            self.hash_hex(),
            self.origin_node_id
        )
    }
}
