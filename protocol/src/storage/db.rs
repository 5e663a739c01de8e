//! # ChainDb — Persistent Height & Queue Storage
//!
//! sled-backed storage for the two records the admission controller reads.
//!
//! ## Tree Layout
//!
//! | Tree       | Key           | Value                    |
//! |------------|---------------|--------------------------|
//! | `metadata` | `info_block`  | `bincode(ChainHeight)`   |
//! | `queue`    | `queue_block` | `bincode(SyncCandidate)` |
//!
//! The queue holds a single slot. A new announcement replaces whatever was
//! there; the admission controller removes it when it is rejected.
//!
//! ## Atomicity
//!
//! Both removals are compare-and-delete operations on the slot. If the
//! ingestion side swaps in a fresh candidate between our read and our
//! delete, the CAS fails, we re-read, and the fresh candidate is judged on
//! its own merits instead of being dropped with the old one.

use sled::{Db, IVec, Tree};
use std::path::Path;

use super::records::{ChainHeight, SyncCandidate};
use super::store::{CandidateQueue, HeightStore};

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("key not found: {0}")]
    NotFound(String),
}

pub type DbResult<T> = Result<T, DbError>;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Well-known key in the `metadata` tree for the local chain tip.
const META_INFO_BLOCK: &[u8] = b"info_block";

/// Well-known key in the `queue` tree for the pending candidate.
const QUEUE_SLOT: &[u8] = b"queue_block";

// ---------------------------------------------------------------------------
// ChainDb
// ---------------------------------------------------------------------------

/// Persistent storage for the local chain tip and the candidate queue.
///
/// Cheap to clone; clones share the same sled handles.
#[derive(Debug, Clone)]
pub struct ChainDb {
    /// The underlying sled database handle.
    db: Db,
    /// Chain metadata (currently just the info block).
    metadata: Tree,
    /// Single-slot candidate queue.
    queue: Tree,
}

impl ChainDb {
    /// Open or create a database at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a temporary database that is removed when dropped.
    pub fn open_temporary() -> DbResult<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config.open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> DbResult<Self> {
        let metadata = db.open_tree("metadata")?;
        let queue = db.open_tree("queue")?;

        Ok(Self { db, metadata, queue })
    }

    // -- Chain tip ----------------------------------------------------------

    /// Record the local chain tip. Called by the block-application side.
    pub fn set_chain_height(&self, height: &ChainHeight) -> DbResult<()> {
        self.metadata.insert(META_INFO_BLOCK, encode(height)?)?;
        Ok(())
    }

    /// The local chain tip, or `None` if none has been recorded.
    pub fn get_chain_height(&self) -> DbResult<Option<ChainHeight>> {
        self.metadata
            .get(META_INFO_BLOCK)?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    // -- Candidate queue ----------------------------------------------------

    /// Put a candidate in the queue slot, replacing any previous one.
    pub fn enqueue_candidate(&self, candidate: &SyncCandidate) -> DbResult<()> {
        self.queue.insert(QUEUE_SLOT, encode(candidate)?)?;
        Ok(())
    }

    /// The queued candidate, if any.
    pub fn get_candidate(&self) -> DbResult<Option<SyncCandidate>> {
        self.queue
            .get(QUEUE_SLOT)?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    /// Remove the queued candidate if `matches` holds for it.
    fn remove_candidate_if<F>(&self, matches: F) -> DbResult<bool>
    where
        F: Fn(&SyncCandidate) -> bool,
    {
        loop {
            let Some(raw) = self.queue.get(QUEUE_SLOT)? else {
                return Ok(false);
            };
            let candidate: SyncCandidate = decode(&raw)?;
            if !matches(&candidate) {
                return Ok(false);
            }
            match self
                .queue
                .compare_and_swap(QUEUE_SLOT, Some(&raw), None::<&[u8]>)?
            {
                Ok(()) => return Ok(true),
                // Slot changed between get and CAS; judge the new value.
                Err(_) => continue,
            }
        }
    }

    // -- Utility ------------------------------------------------------------

    /// Force a flush of all pending writes to disk.
    pub fn flush(&self) -> DbResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl HeightStore for ChainDb {
    fn current_height(&self) -> DbResult<Option<ChainHeight>> {
        self.get_chain_height()
    }
}

impl CandidateQueue for ChainDb {
    fn peek(&self) -> DbResult<Option<SyncCandidate>> {
        self.get_candidate()
    }

    fn delete_stale(&self, up_to: u64) -> DbResult<bool> {
        self.remove_candidate_if(|c| c.block_id <= up_to)
    }

    fn delete_by_hash(&self, hash: &[u8]) -> DbResult<bool> {
        self.remove_candidate_if(|c| c.block_hash == hash)
    }
}

fn encode<T: serde::Serialize>(value: &T) -> DbResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| DbError::Serialization(e.to_string()))
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &IVec) -> DbResult<T> {
    bincode::deserialize(bytes).map_err(|e| DbError::Serialization(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
