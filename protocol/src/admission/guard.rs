//! Concurrency primitives for admission cycles.
//!
//! Two layers, each with its own job:
//!
//! - [`RunFlag`] is a per-controller single-flight flag. A timer tick that
//!   lands while a cycle is still running gets a no-op instead of queuing up
//!   behind it.
//! - [`ChainLock`] is the process-wide exclusive lock shared with every
//!   component that mutates chain or queue state. Admission holds it for the
//!   whole decision, including the updater call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

// ---------------------------------------------------------------------------
// RunFlag
// ---------------------------------------------------------------------------

/// Non-blocking test-and-set flag.
#[derive(Debug, Default)]
pub struct RunFlag {
    running: AtomicBool,
}

impl RunFlag {
    pub const fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
        }
    }

    /// Set the flag if it is clear. Returns `None` if it was already set.
    ///
    /// The flag is cleared when the returned guard drops, including during
    /// unwinding.
    pub fn try_acquire(&self) -> Option<RunGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard { flag: &self.running })
    }

    pub fn is_set(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Clears its [`RunFlag`] on drop.
#[derive(Debug)]
pub struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// ChainLock
// ---------------------------------------------------------------------------

/// Guard returned by [`ChainLock::lock`].
pub type ChainLockGuard<'a> = MutexGuard<'a, ()>;

/// Exclusive lock over chain and queue state.
///
/// Clones share the same lock. Hand one clone to every mutator (block
/// application, block production, admission). Not reentrant: a task that
/// already holds the guard and calls `lock` again deadlocks.
#[derive(Debug, Clone, Default)]
pub struct ChainLock {
    inner: Arc<Mutex<()>>,
}

impl ChainLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access. Released when the guard drops.
    pub async fn lock(&self) -> ChainLockGuard<'_> {
        self.inner.lock().await
    }

    /// Take the lock only if it is free right now.
    pub fn try_lock(&self) -> Option<ChainLockGuard<'_>> {
        self.inner.try_lock().ok()
    }
}
