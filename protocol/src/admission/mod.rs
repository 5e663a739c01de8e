//! # Admission Module
//!
//! Decides whether a queued block announcement is pulled or discarded.
//!
//! ```text
//! guard.rs      — RunFlag (single-flight) and ChainLock (exclusive lock)
//! policy.rs     — pure check pipeline: Verdict, Rejection, Cleanup
//! controller.rs — AdmissionController: one cycle, stores + updater
//! daemon.rs     — QueueDaemon: runs cycles on a timer until shutdown
//! ```
//!
//! ## Design Decisions
//!
//! - The running flag is per controller, not a process-wide static. Two
//!   controllers in one process (tests, multi-chain setups) never block
//!   each other's cycles.
//! - The chain lock is passed in, not ambient. Whoever builds the
//!   controller decides which other components share it.
//! - "Nothing queued" is `CycleOutcome::Absent`, not an error. Callers that
//!   alert on errors don't page anyone for an idle queue.

pub mod controller;
pub mod daemon;
pub mod guard;
pub mod policy;

pub use controller::{AdmissionController, AdmissionError, CycleOutcome};
pub use daemon::{OutcomeObserver, QueueDaemon};
pub use guard::{ChainLock, ChainLockGuard, RunFlag, RunGuard};
pub use policy::{evaluate, Cleanup, Rejection, Verdict};
