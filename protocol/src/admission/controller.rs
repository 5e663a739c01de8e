//! # Admission Controller
//!
//! One admission cycle, start to finish:
//!
//! ```text
//! try_acquire(RunFlag) ──no──> AlreadyRunning
//!        │
//!   lock(ChainLock)
//!        │
//!   read tip + queued candidate
//!        │
//!   evaluate() ── Absent ───────────────> Absent
//!        │     └─ Reject ── cleanup ────> Rejected
//!      Admit
//!        │
//!   resolve origin ── unknown ── delete ─> Rejected
//!        │
//!   ChainUpdater::sync ─────────────────> Delegated(result)
//! ```
//!
//! The chain lock is held from the first read to the updater's return, so a
//! decision and the queue deletion it causes are one critical section.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::guard::{ChainLock, RunFlag};
use super::policy::{evaluate, Cleanup, Rejection, Verdict};
use crate::network::{ChainUpdater, NetworkParameters, PeerAddress, UpdateError};
use crate::storage::{CandidateQueue, DbError, HeightStore, SyncCandidate};

// ---------------------------------------------------------------------------
// Outcome & Error
// ---------------------------------------------------------------------------

/// How an admission cycle ended, when it did not hit a store error.
#[derive(Debug)]
pub enum CycleOutcome {
    /// Another cycle on this controller was still running.
    AlreadyRunning,

    /// Nothing queued.
    Absent { local_height: u64 },

    /// The candidate was turned away.
    Rejected {
        candidate: SyncCandidate,
        local_height: u64,
        rejection: Rejection,
        /// Whether the cleanup actually removed the candidate.
        removed: bool,
    },

    /// The candidate was handed to the chain updater. `result` is the
    /// updater's own return value.
    Delegated {
        candidate: SyncCandidate,
        local_height: u64,
        peer: PeerAddress,
        result: Result<(), UpdateError>,
    },
}

impl CycleOutcome {
    /// Short stable label, used for metrics and the status API.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AlreadyRunning => "already_running",
            Self::Absent { .. } => "absent",
            Self::Rejected { rejection, .. } => rejection.reason(),
            Self::Delegated { result: Ok(()), .. } => "delegated",
            Self::Delegated { result: Err(_), .. } => "delegated_failure",
        }
    }

    /// True for rejections and updater failures.
    ///
    /// `AlreadyRunning` and `Absent` are informational.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::Rejected { .. } | Self::Delegated { result: Err(_), .. }
        )
    }
}

/// A cycle that could not reach a decision.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] DbError),

    /// The candidate was rejected, but removing it from the queue failed.
    /// It may still be queued; the next cycle judges it again.
    #[error("block {} rejected ({rejection}) but not removed from the queue: {source}", .candidate.block_id)]
    CleanupFailed {
        candidate: SyncCandidate,
        local_height: u64,
        rejection: Rejection,
        source: DbError,
    },
}

// ---------------------------------------------------------------------------
// AdmissionController
// ---------------------------------------------------------------------------

/// Gatekeeper between the candidate queue and the chain updater.
pub struct AdmissionController {
    heights: Arc<dyn HeightStore>,
    queue: Arc<dyn CandidateQueue>,
    network: Arc<dyn NetworkParameters>,
    updater: Arc<dyn ChainUpdater>,
    lock: ChainLock,
    self_node_id: i64,
    running: RunFlag,
}

impl AdmissionController {
    pub fn new(
        heights: Arc<dyn HeightStore>,
        queue: Arc<dyn CandidateQueue>,
        network: Arc<dyn NetworkParameters>,
        updater: Arc<dyn ChainUpdater>,
        lock: ChainLock,
        self_node_id: i64,
    ) -> Self {
        Self {
            heights,
            queue,
            network,
            updater,
            lock,
            self_node_id,
            running: RunFlag::new(),
        }
    }

    /// This node's id; candidates carrying it are never pulled.
    pub fn self_node_id(&self) -> i64 {
        self.self_node_id
    }

    /// Whether a cycle is in flight on this controller.
    pub fn is_running(&self) -> bool {
        self.running.is_set()
    }

    /// Run one admission cycle.
    ///
    /// Returns immediately with [`CycleOutcome::AlreadyRunning`] if a cycle
    /// is in progress. Otherwise waits for the chain lock and runs to
    /// completion; there is no internal cancellation or retry.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, AdmissionError> {
        let Some(_running) = self.running.try_acquire() else {
            debug!("queue admission already running, skipping");
            return Ok(CycleOutcome::AlreadyRunning);
        };

        let _chain = self.lock.lock().await;
        self.admit_locked().await
    }

    async fn admit_locked(&self) -> Result<CycleOutcome, AdmissionError> {
        let local = self
            .heights
            .current_height()
            .and_then(|h| h.ok_or_else(|| DbError::NotFound("info block".to_string())))
            .map_err(|e| {
                error!(error = %e, "getting info block");
                e
            })?;

        let queued = self.queue.peek().map_err(|e| {
            error!(error = %e, "getting queue block");
            e
        })?;

        let verdict = evaluate(
            &local,
            queued.as_ref(),
            self.self_node_id,
            self.network.rollback_limit(),
        );

        let candidate = match (verdict, queued) {
            (Verdict::Admit, Some(candidate)) => candidate,
            (Verdict::Reject { rejection, cleanup }, Some(candidate)) => {
                return self.discard(candidate, local.block_id, rejection, cleanup);
            }
            _ => {
                debug!(local_height = local.block_id, "queue block not found");
                return Ok(CycleOutcome::Absent {
                    local_height: local.block_id,
                });
            }
        };

        let peer = match self.network.resolve_address(candidate.origin_node_id) {
            Ok(peer) => peer,
            Err(source) => {
                let rejection = Rejection::PeerResolutionFailed {
                    candidate: candidate.block_id,
                    source,
                };
                return self.discard(candidate, local.block_id, rejection, Cleanup::DeleteByHash);
            }
        };

        info!(
            candidate = candidate.block_id,
            hash = %candidate.hash_hex(),
            local_height = local.block_id,
            origin = candidate.origin_node_id,
            peer = %peer,
            "updating chain from honor node"
        );

        let result = self.updater.sync(&peer, candidate.block_id).await;
        match &result {
            Ok(()) => info!(
                candidate = candidate.block_id,
                peer = %peer,
                "chain update finished"
            ),
            Err(e) => error!(
                candidate = candidate.block_id,
                peer = %peer,
                error = %e,
                "chain update failed"
            ),
        }

        Ok(CycleOutcome::Delegated {
            candidate,
            local_height: local.block_id,
            peer,
            result,
        })
    }

    /// Log the rejection, apply its queue cleanup and build the outcome.
    fn discard(
        &self,
        candidate: SyncCandidate,
        local_height: u64,
        rejection: Rejection,
        cleanup: Cleanup,
    ) -> Result<CycleOutcome, AdmissionError> {
        if matches!(rejection, Rejection::SelfOriginated { .. }) {
            debug!(
                candidate = candidate.block_id,
                origin = candidate.origin_node_id,
                "queue block generated by this node"
            );
        } else {
            warn!(
                candidate = candidate.block_id,
                hash = %candidate.hash_hex(),
                local_height,
                origin = candidate.origin_node_id,
                reason = rejection.reason(),
                error = %rejection,
                "queue block rejected"
            );
        }

        let removal = match cleanup {
            Cleanup::Keep => Ok(false),
            Cleanup::DeleteStale => self.queue.delete_stale(candidate.block_id),
            Cleanup::DeleteByHash => self.queue.delete_by_hash(&candidate.block_hash),
        };

        let removed = match removal {
            Ok(removed) => removed,
            Err(source) => {
                error!(
                    candidate = candidate.block_id,
                    local_height,
                    origin = candidate.origin_node_id,
                    reason = rejection.reason(),
                    error = %source,
                    "deleting rejected queue block"
                );
                return Err(AdmissionError::CleanupFailed {
                    candidate,
                    local_height,
                    rejection,
                    source,
                });
            }
        };

        Ok(CycleOutcome::Rejected {
            candidate,
            local_height,
            rejection,
            removed,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{HonorNode, HonorNodeDirectory, ResolveError};
    use crate::storage::{ChainDb, ChainHeight, DbResult};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    const SELF_ID: i64 = 1;

    // -- Helpers ------------------------------------------------------------

    /// Records every call and returns a canned result.
    #[derive(Default)]
    struct RecordingUpdater {
        calls: Mutex<Vec<(String, u64)>>,
        fail_with: Option<String>,
    }

    #[async_trait]
    impl ChainUpdater for RecordingUpdater {
        async fn sync(&self, peer: &PeerAddress, target: u64) -> Result<(), UpdateError> {
            self.calls.lock().push((peer.to_string(), target));
            match &self.fail_with {
                Some(reason) => Err(UpdateError::Apply(reason.clone())),
                None => Ok(()),
            }
        }
    }

    /// Blocks inside `sync` until released.
    #[derive(Default)]
    struct GatedUpdater {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl ChainUpdater for GatedUpdater {
        async fn sync(&self, _peer: &PeerAddress, _target: u64) -> Result<(), UpdateError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(())
        }
    }

    /// A height store that always fails.
    struct BrokenHeights;

    impl HeightStore for BrokenHeights {
        fn current_height(&self) -> DbResult<Option<ChainHeight>> {
            Err(DbError::Serialization("corrupt info block".to_string()))
        }
    }

    /// A queue whose reads and deletes can be made to fail.
    struct FailingQueue {
        queued: Option<SyncCandidate>,
        fail_peek: bool,
    }

    impl CandidateQueue for FailingQueue {
        fn peek(&self) -> DbResult<Option<SyncCandidate>> {
            if self.fail_peek {
                return Err(DbError::Serialization("corrupt queue block".to_string()));
            }
            Ok(self.queued.clone())
        }

        fn delete_stale(&self, _up_to: u64) -> DbResult<bool> {
            Err(DbError::Serialization("disk".to_string()))
        }

        fn delete_by_hash(&self, _hash: &[u8]) -> DbResult<bool> {
            Err(DbError::Serialization("disk".to_string()))
        }
    }

    fn controller_over(
        queue: FailingQueue,
        updater: Arc<RecordingUpdater>,
    ) -> AdmissionController {
        let db = ChainDb::open_temporary().expect("temp db");
        db.set_chain_height(&ChainHeight::new(100, vec![0x10; 32]))
            .unwrap();
        AdmissionController::new(
            Arc::new(db),
            Arc::new(queue),
            directory(),
            updater,
            ChainLock::new(),
            SELF_ID,
        )
    }

    struct Harness {
        controller: AdmissionController,
        db: ChainDb,
        updater: Arc<RecordingUpdater>,
    }

    fn directory() -> Arc<HonorNodeDirectory> {
        Arc::new(HonorNodeDirectory::with_nodes(
            50,
            7078,
            vec![
                HonorNode {
                    node_id: 7,
                    tcp_address: "10.0.0.5:7711".to_string(),
                },
                HonorNode {
                    node_id: 8,
                    tcp_address: "10.0.0.6".to_string(),
                },
            ],
        ))
    }

    fn setup_with(updater: RecordingUpdater) -> Harness {
        let db = ChainDb::open_temporary().expect("temp db");
        db.set_chain_height(&ChainHeight::new(100, vec![0x10; 32]))
            .unwrap();
        let updater = Arc::new(updater);
        let store = Arc::new(db.clone());

        let controller = AdmissionController::new(
            store.clone(),
            store,
            directory(),
            updater.clone(),
            ChainLock::new(),
            SELF_ID,
        );

        Harness {
            controller,
            db,
            updater,
        }
    }

    fn setup() -> Harness {
        setup_with(RecordingUpdater::default())
    }

    fn enqueue(db: &ChainDb, block_id: u64, origin: i64) -> SyncCandidate {
        let candidate = SyncCandidate::new(block_id, vec![block_id as u8; 32], origin);
        db.enqueue_candidate(&candidate).unwrap();
        candidate
    }

    // -- Tests --------------------------------------------------------------

    #[tokio::test]
    async fn admits_candidate_in_window() {
        let h = setup();
        enqueue(&h.db, 120, 7);

        let outcome = h.controller.run_cycle().await.unwrap();

        match outcome {
            CycleOutcome::Delegated {
                peer,
                candidate,
                local_height,
                result,
            } => {
                assert_eq!(peer.as_str(), "10.0.0.5:7711");
                assert_eq!(candidate.block_id, 120);
                assert_eq!(local_height, 100);
                assert!(result.is_ok());
            }
            other => panic!("expected Delegated, got {other:?}"),
        }
        assert_eq!(
            *h.updater.calls.lock(),
            vec![("10.0.0.5:7711".to_string(), 120)]
        );
        // Admission never consumes the candidate itself.
        assert!(h.db.peek().unwrap().is_some());
    }

    #[tokio::test]
    async fn default_port_applied_when_delegating() {
        let h = setup();
        enqueue(&h.db, 101, 8);

        h.controller.run_cycle().await.unwrap();
        assert_eq!(*h.updater.calls.lock(), vec![("10.0.0.6:7078".to_string(), 101)]);
    }

    #[tokio::test]
    async fn beyond_rollback_limit_is_deleted() {
        let h = setup();
        enqueue(&h.db, 160, 7);

        let outcome = h.controller.run_cycle().await.unwrap();

        assert!(matches!(
            outcome,
            CycleOutcome::Rejected {
                rejection: Rejection::RollbackLimitExceeded {
                    candidate: 160,
                    local: 100,
                    limit: 50,
                },
                removed: true,
                ..
            }
        ));
        assert!(h.db.peek().unwrap().is_none());
        assert!(h.updater.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn stale_candidate_is_deleted() {
        let h = setup();
        enqueue(&h.db, 100, 7);

        let outcome = h.controller.run_cycle().await.unwrap();

        assert!(matches!(
            outcome,
            CycleOutcome::Rejected {
                rejection: Rejection::StaleCandidate {
                    candidate: 100,
                    local: 100,
                },
                removed: true,
                ..
            }
        ));
        assert!(h.db.peek().unwrap().is_none());
        assert!(h.updater.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn self_originated_is_kept() {
        let h = setup();
        let queued = enqueue(&h.db, 120, SELF_ID);

        let outcome = h.controller.run_cycle().await.unwrap();

        assert!(matches!(
            outcome,
            CycleOutcome::Rejected {
                rejection: Rejection::SelfOriginated { .. },
                removed: false,
                ..
            }
        ));
        assert!(outcome.is_failure());
        assert_eq!(h.db.peek().unwrap(), Some(queued));
        assert!(h.updater.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn unknown_origin_is_deleted() {
        let h = setup();
        enqueue(&h.db, 120, 99);

        let outcome = h.controller.run_cycle().await.unwrap();

        match &outcome {
            CycleOutcome::Rejected {
                rejection: Rejection::PeerResolutionFailed { source, .. },
                removed,
                ..
            } => {
                assert_eq!(*source, ResolveError::UnknownNode(99));
                assert!(*removed);
            }
            other => panic!("expected PeerResolutionFailed, got {other:?}"),
        }
        assert_eq!(outcome.label(), "peer_resolution_failed");
        assert!(h.db.peek().unwrap().is_none());
        assert!(h.updater.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn empty_queue_is_absent_without_side_effects() {
        let h = setup();

        let outcome = h.controller.run_cycle().await.unwrap();

        assert!(matches!(outcome, CycleOutcome::Absent { local_height: 100 }));
        assert!(!outcome.is_failure());
        assert!(h.db.peek().unwrap().is_none());
        assert_eq!(h.db.get_chain_height().unwrap().unwrap().block_id, 100);
        assert!(h.updater.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn placeholder_without_hash_is_absent() {
        let h = setup();
        let placeholder = SyncCandidate::new(120, Vec::new(), 7);
        h.db.enqueue_candidate(&placeholder).unwrap();

        let outcome = h.controller.run_cycle().await.unwrap();

        assert!(matches!(outcome, CycleOutcome::Absent { .. }));
        assert_eq!(h.db.peek().unwrap(), Some(placeholder));
    }

    #[tokio::test]
    async fn updater_failure_is_passed_through() {
        let h = setup_with(RecordingUpdater {
            fail_with: Some("bad state root".to_string()),
            ..Default::default()
        });
        enqueue(&h.db, 120, 7);

        let outcome = h.controller.run_cycle().await.unwrap();

        match &outcome {
            CycleOutcome::Delegated {
                result: Err(UpdateError::Apply(reason)),
                ..
            } => assert_eq!(reason, "bad state root"),
            other => panic!("expected delegated failure, got {other:?}"),
        }
        assert_eq!(outcome.label(), "delegated_failure");
        assert!(outcome.is_failure());
        assert_eq!(h.updater.calls.lock().len(), 1);
        assert!(h.db.peek().unwrap().is_some());
    }

    #[tokio::test]
    async fn missing_info_block_is_store_error() {
        let db = ChainDb::open_temporary().unwrap();
        enqueue(&db, 120, 7);
        let store = Arc::new(db.clone());
        let updater = Arc::new(RecordingUpdater::default());
        let controller = AdmissionController::new(
            store.clone(),
            store,
            directory(),
            updater.clone(),
            ChainLock::new(),
            SELF_ID,
        );

        let err = controller.run_cycle().await.unwrap_err();
        assert!(matches!(
            err,
            AdmissionError::StoreUnavailable(DbError::NotFound(_))
        ));
        assert!(db.peek().unwrap().is_some());
        assert!(updater.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn store_error_releases_run_flag() {
        let db = ChainDb::open_temporary().unwrap();
        let controller = AdmissionController::new(
            Arc::new(BrokenHeights),
            Arc::new(db),
            directory(),
            Arc::new(RecordingUpdater::default()),
            ChainLock::new(),
            SELF_ID,
        );

        assert!(controller.run_cycle().await.is_err());
        assert!(!controller.is_running());
        // And the next cycle is not mistaken for an overlap.
        assert!(matches!(
            controller.run_cycle().await,
            Err(AdmissionError::StoreUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn failed_stale_delete_keeps_rejection_context() {
        let updater = Arc::new(RecordingUpdater::default());
        let controller = controller_over(
            FailingQueue {
                queued: Some(SyncCandidate::new(90, vec![0x5A; 32], 7)),
                fail_peek: false,
            },
            updater.clone(),
        );

        let err = controller.run_cycle().await.unwrap_err();

        match &err {
            AdmissionError::CleanupFailed {
                candidate,
                local_height,
                rejection,
                source,
            } => {
                assert_eq!(candidate.block_id, 90);
                assert_eq!(candidate.origin_node_id, 7);
                assert_eq!(*local_height, 100);
                assert_eq!(
                    *rejection,
                    Rejection::StaleCandidate {
                        candidate: 90,
                        local: 100,
                    }
                );
                assert!(matches!(source, DbError::Serialization(_)));
            }
            other => panic!("expected CleanupFailed, got {other:?}"),
        }
        let message = err.to_string();
        assert!(message.contains("block 90"));
        assert!(message.contains("old block 90 <= 100"));
        assert!(!controller.is_running());
        assert!(updater.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn failed_delete_on_each_destructive_rule() {
        // Beyond the window, and an unknown origin.
        for (block_id, origin, reason) in [
            (160, 7, "rollback_limit_exceeded"),
            (120, 99, "peer_resolution_failed"),
        ] {
            let updater = Arc::new(RecordingUpdater::default());
            let controller = controller_over(
                FailingQueue {
                    queued: Some(SyncCandidate::new(block_id, vec![0x5A; 32], origin)),
                    fail_peek: false,
                },
                updater.clone(),
            );

            match controller.run_cycle().await {
                Err(AdmissionError::CleanupFailed {
                    candidate,
                    rejection,
                    ..
                }) => {
                    assert_eq!(candidate.block_id, block_id);
                    assert_eq!(rejection.reason(), reason);
                }
                other => panic!("expected CleanupFailed for {reason}, got {other:?}"),
            }
            assert!(!controller.is_running());
            assert!(updater.calls.lock().is_empty());
        }
    }

    #[tokio::test]
    async fn self_originated_never_touches_failing_queue() {
        let controller = controller_over(
            FailingQueue {
                queued: Some(SyncCandidate::new(120, vec![0x5A; 32], SELF_ID)),
                fail_peek: false,
            },
            Arc::new(RecordingUpdater::default()),
        );

        let outcome = controller.run_cycle().await.unwrap();
        assert!(matches!(
            outcome,
            CycleOutcome::Rejected {
                rejection: Rejection::SelfOriginated { .. },
                removed: false,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn queue_read_error_is_store_error() {
        let updater = Arc::new(RecordingUpdater::default());
        let controller = controller_over(
            FailingQueue {
                queued: None,
                fail_peek: true,
            },
            updater.clone(),
        );

        let err = controller.run_cycle().await.unwrap_err();
        assert!(matches!(
            err,
            AdmissionError::StoreUnavailable(DbError::Serialization(_))
        ));
        assert!(!controller.is_running());
        assert!(updater.calls.lock().is_empty());

        // The flag really is free: the next cycle runs and fails the same way.
        assert!(matches!(
            controller.run_cycle().await,
            Err(AdmissionError::StoreUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn overlapping_cycle_is_a_noop() {
        let db = ChainDb::open_temporary().unwrap();
        db.set_chain_height(&ChainHeight::new(100, vec![0x10; 32]))
            .unwrap();
        let queued = enqueue(&db, 120, 7);
        let store = Arc::new(db.clone());
        let updater = Arc::new(GatedUpdater::default());
        let controller = Arc::new(AdmissionController::new(
            store.clone(),
            store,
            directory(),
            updater.clone(),
            ChainLock::new(),
            SELF_ID,
        ));

        let first = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.run_cycle().await })
        };
        updater.entered.notified().await;
        assert!(controller.is_running());

        let second = controller.run_cycle().await.unwrap();
        assert!(matches!(second, CycleOutcome::AlreadyRunning));
        assert_eq!(db.peek().unwrap(), Some(queued));

        updater.release.notify_one();
        let first = first.await.unwrap().unwrap();
        assert!(matches!(first, CycleOutcome::Delegated { result: Ok(()), .. }));
        assert!(!controller.is_running());
    }

    #[tokio::test]
    async fn cycle_waits_for_chain_lock() {
        let h = setup();
        enqueue(&h.db, 100, 7);
        let lock = ChainLock::new();
        let store = Arc::new(h.db.clone());
        let controller = Arc::new(AdmissionController::new(
            store.clone(),
            store,
            directory(),
            h.updater.clone(),
            lock.clone(),
            SELF_ID,
        ));

        let held = lock.lock().await;
        let cycle = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.run_cycle().await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!cycle.is_finished());
        // The stale candidate must not be touched while another mutator
        // holds the lock.
        assert!(h.db.peek().unwrap().is_some());

        drop(held);
        let outcome = cycle.await.unwrap().unwrap();
        assert!(matches!(
            outcome,
            CycleOutcome::Rejected {
                rejection: Rejection::StaleCandidate { .. },
                ..
            }
        ));
        assert!(h.db.peek().unwrap().is_none());
    }

    #[tokio::test]
    async fn controllers_do_not_share_run_flags() {
        let a = setup();
        let b = setup();
        enqueue(&a.db, 120, 7);
        enqueue(&b.db, 130, 8);

        let (ra, rb) = tokio::join!(a.controller.run_cycle(), b.controller.run_cycle());
        assert!(matches!(ra.unwrap(), CycleOutcome::Delegated { .. }));
        assert!(matches!(rb.unwrap(), CycleOutcome::Delegated { .. }));
    }
}
