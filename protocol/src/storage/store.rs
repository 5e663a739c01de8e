//! Store interfaces consumed by the admission controller.
//!
//! The controller only ever sees these traits. [`ChainDb`](super::ChainDb)
//! implements both on top of sled; tests plug in their own.

use super::db::DbResult;
use super::records::{ChainHeight, SyncCandidate};

/// Read-only view of the locally confirmed chain tip.
pub trait HeightStore: Send + Sync {
    /// The current tip, or `None` if nothing has been applied yet.
    fn current_height(&self) -> DbResult<Option<ChainHeight>>;
}

/// The single-slot queue of announced-but-unpulled blocks.
pub trait CandidateQueue: Send + Sync {
    /// The queued candidate, if any. Does not remove it.
    fn peek(&self) -> DbResult<Option<SyncCandidate>>;

    /// Remove the queued candidate if its `block_id <= up_to`.
    ///
    /// Returns `true` if something was removed.
    fn delete_stale(&self, up_to: u64) -> DbResult<bool>;

    /// Remove the queued candidate only if its hash equals `hash`.
    ///
    /// A candidate that was replaced since it was read is left alone.
    fn delete_by_hash(&self, hash: &[u8]) -> DbResult<bool>;
}
