//! Chain updater used until a block fetch pipeline is wired in.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::warn;

use blockgate_protocol::network::{ChainUpdater, PeerAddress, UpdateError};

/// Logs each hand-off and fails it. The candidate stays queued, so the
/// next cycle retries it once a real updater replaces this one.
///
/// `run` never enqueues candidates itself and holds the store's exclusive
/// sled lock, so with nothing writing the queue in-process this updater is
/// not reached in practice; every cycle reports `absent`.
#[derive(Debug, Default)]
pub struct DetachedUpdater {
    handoffs: AtomicU64,
}

#[async_trait]
impl ChainUpdater for DetachedUpdater {
    async fn sync(&self, peer: &PeerAddress, target_block_id: u64) -> Result<(), UpdateError> {
        let handoffs = self.handoffs.fetch_add(1, Ordering::Relaxed) + 1;
        warn!(
            peer = %peer,
            target = target_block_id,
            handoffs,
            "no block fetch pipeline attached; leaving candidate queued"
        );
        Err(UpdateError::Apply(
            "no block fetch pipeline attached".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockgate_protocol::network::with_default_port;

    #[tokio::test]
    async fn every_handoff_is_counted_and_failed() {
        let updater = DetachedUpdater::default();
        let peer = with_default_port("10.0.0.5", 7078).unwrap();

        for _ in 0..2 {
            let err = updater.sync(&peer, 120).await.unwrap_err();
            assert!(matches!(err, UpdateError::Apply(_)));
        }
        assert_eq!(updater.handoffs.load(Ordering::Relaxed), 2);
    }
}
