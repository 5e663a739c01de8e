//! The hand-off point from admission to the block fetch pipeline.
//!
//! Everything behind this trait (downloading bodies, verifying, applying,
//! rolling back on failure) belongs to the caller. The admission controller
//! only decides *whether* to call it, and passes its result back untouched.

use async_trait::async_trait;

use super::directory::PeerAddress;

/// Failure reported by a [`ChainUpdater`].
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("peer {peer} unreachable: {reason}")]
    PeerUnreachable { peer: PeerAddress, reason: String },

    #[error("block {block_id} failed verification: {reason}")]
    InvalidBlock { block_id: u64, reason: String },

    #[error("applying blocks failed: {0}")]
    Apply(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Pulls blocks up to `target_block_id` from `peer` and applies them.
///
/// Called while the chain lock is held: implementations must not take
/// the same lock, and should bound their own run time.
#[async_trait]
pub trait ChainUpdater: Send + Sync {
    async fn sync(&self, peer: &PeerAddress, target_block_id: u64) -> Result<(), UpdateError>;
}
