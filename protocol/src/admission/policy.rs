//! # Admission Policy
//!
//! The pure half of an admission cycle: given the local tip and the queued
//! candidate, decide what should happen. No I/O, no locks. The controller
//! applies whatever cleanup the verdict asks for.
//!
//! Checks run in order and stop at the first match:
//!
//! | # | Condition                          | Verdict                  | Queue cleanup  |
//! |---|------------------------------------|--------------------------|----------------|
//! | 1 | no candidate / empty hash          | `Absent`                 | none           |
//! | 2 | `block_id > local + rollback_limit`| `RollbackLimitExceeded`  | delete stale   |
//! | 3 | `block_id <= local`                | `StaleCandidate`         | delete stale   |
//! | 4 | `origin == self`                   | `SelfOriginated`         | keep           |
//! | - | otherwise                          | `Admit`                  | none           |
//!
//! Peer resolution (the fifth check) needs the network directory, so the
//! controller runs it after an `Admit` verdict.

use crate::network::ResolveError;
use crate::storage::{ChainHeight, SyncCandidate};

/// Why a candidate was turned away.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("block {candidate} is beyond the rollback limit ({local} + {limit})")]
    RollbackLimitExceeded { candidate: u64, local: u64, limit: u64 },

    #[error("old block {candidate} <= {local}")]
    StaleCandidate { candidate: u64, local: u64 },

    #[error("block {candidate} was generated by this node ({node_id})")]
    SelfOriginated { candidate: u64, node_id: i64 },

    #[error("cannot resolve origin of block {candidate}: {source}")]
    PeerResolutionFailed {
        candidate: u64,
        source: ResolveError,
    },
}

impl Rejection {
    /// Short stable label, used for metrics and the status API.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::RollbackLimitExceeded { .. } => "rollback_limit_exceeded",
            Self::StaleCandidate { .. } => "stale_candidate",
            Self::SelfOriginated { .. } => "self_originated",
            Self::PeerResolutionFailed { .. } => "peer_resolution_failed",
        }
    }
}

/// What to do with the queued candidate after a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cleanup {
    /// Leave it queued.
    Keep,
    /// Remove every queued candidate at or below the rejected block id.
    DeleteStale,
    /// Remove the candidate only if its hash still matches.
    DeleteByHash,
}

/// Outcome of the local checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Absent,
    Reject { rejection: Rejection, cleanup: Cleanup },
    Admit,
}

/// Run checks 1–4 against the queued candidate.
///
/// `local + rollback_limit` saturates, so a huge limit never wraps into
/// rejecting everything.
pub fn evaluate(
    local: &ChainHeight,
    candidate: Option<&SyncCandidate>,
    self_node_id: i64,
    rollback_limit: u64,
) -> Verdict {
    let candidate = match candidate {
        Some(c) if !c.is_empty() => c,
        _ => return Verdict::Absent,
    };

    if candidate.block_id > local.block_id.saturating_add(rollback_limit) {
        return Verdict::Reject {
            rejection: Rejection::RollbackLimitExceeded {
                candidate: candidate.block_id,
                local: local.block_id,
                limit: rollback_limit,
            },
            cleanup: Cleanup::DeleteStale,
        };
    }

    if candidate.block_id <= local.block_id {
        return Verdict::Reject {
            rejection: Rejection::StaleCandidate {
                candidate: candidate.block_id,
                local: local.block_id,
            },
            cleanup: Cleanup::DeleteStale,
        };
    }

    if candidate.origin_node_id == self_node_id {
        return Verdict::Reject {
            rejection: Rejection::SelfOriginated {
                candidate: candidate.block_id,
                node_id: self_node_id,
            },
            cleanup: Cleanup::Keep,
        };
    }

    Verdict::Admit
}
