//! # Queue Daemon
//!
//! Drives an [`AdmissionController`] on a fixed interval until told to stop.
//!
//! Each tick runs one cycle and reports the result to an optional
//! [`OutcomeObserver`] (the node uses this for Prometheus counters and the
//! status endpoint). Failures are logged and otherwise ignored: the next
//! tick is the retry.
//!
//! ## Shutdown
//!
//! The loop watches a `tokio::sync::watch` channel. When the sender sends
//! `true` or is dropped, the loop exits after the in-flight cycle finishes.
//! A cycle is never abandoned halfway through.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info};

use super::controller::{AdmissionController, AdmissionError, CycleOutcome};
use crate::config;

/// Receives the result of every cycle the daemon runs.
pub trait OutcomeObserver: Send + Sync {
    fn observe(&self, outcome: &Result<CycleOutcome, AdmissionError>);
}

/// Periodic driver for queue admission.
pub struct QueueDaemon {
    controller: Arc<AdmissionController>,
    interval: Duration,
    observer: Option<Arc<dyn OutcomeObserver>>,
}

impl QueueDaemon {
    pub fn new(controller: Arc<AdmissionController>) -> Self {
        Self {
            controller,
            interval: config::QUEUE_CHECK_INTERVAL,
            observer: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn OutcomeObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one cycle and report it.
    pub async fn tick(&self) -> Result<CycleOutcome, AdmissionError> {
        let outcome = self.controller.run_cycle().await;
        if let Err(e) = &outcome {
            error!(error = %e, "queue admission cycle failed");
        }
        if let Some(observer) = &self.observer {
            observer.observe(&outcome);
        }
        outcome
    }

    /// Tick every `interval` until `shutdown` fires.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(interval_ms = self.interval.as_millis() as u64, "queue daemon starting");

        loop {
            if *shutdown.borrow() {
                break;
            }

            // Errors are already logged and observed; the next tick retries.
            let _ = self.tick().await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("queue daemon stopped");
    }
}
