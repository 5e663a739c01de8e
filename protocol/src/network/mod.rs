//! # Network Module
//!
//! The peer-facing collaborators of the admission controller.
//!
//! ```text
//! directory.rs — rollback limit + honor node id → address resolution
//! updater.rs   — ChainUpdater trait, the seam to the block fetch pipeline
//! ```
//!
//! Neither file opens a socket. Transport lives behind `ChainUpdater`, which
//! keeps admission testable without a live peer.

pub mod directory;
pub mod updater;

pub use directory::{
    with_default_port, HonorNode, HonorNodeDirectory, NetworkParameters, PeerAddress, ResolveError,
};
pub use updater::{ChainUpdater, UpdateError};
