//! # Storage Module
//!
//! Persistence for the local chain tip and the candidate queue.
//!
//! ## Architecture
//!
//! ```text
//! records.rs — ChainHeight and SyncCandidate
//! store.rs   — HeightStore / CandidateQueue traits the controller reads
//! db.rs      — sled implementation of both traits
//! ```
//!
//! Records are stored with bincode. JSON is for the status API only.

pub mod db;
pub mod records;
pub mod store;

pub use db::{ChainDb, DbError, DbResult};
pub use records::{ChainHeight, SyncCandidate};
pub use store::{CandidateQueue, HeightStore};
