//! Last-cycle bookkeeping for the status API.
//!
//! [`StatusTracker`] is the node's [`OutcomeObserver`]: it feeds every cycle
//! into the Prometheus counters and keeps a JSON-ready summary of the most
//! recent one that got past the single-flight check.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use blockgate_protocol::admission::{AdmissionError, CycleOutcome, OutcomeObserver};

use crate::metrics::SharedMetrics;

/// Summary of one admission cycle, as served by `GET /status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    /// `CycleOutcome::label()`, `"cleanup_failed"` or `"store_error"`.
    pub outcome: String,
    pub failure: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_block_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_height: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer: Option<String>,
    /// Rejection or error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub at: DateTime<Utc>,
}

impl CycleReport {
    pub fn from_result(result: &Result<CycleOutcome, AdmissionError>, at: DateTime<Utc>) -> Self {
        let mut report = Self {
            outcome: String::new(),
            failure: true,
            candidate_block_id: None,
            local_height: None,
            peer: None,
            detail: None,
            at,
        };

        match result {
            Ok(outcome) => {
                report.outcome = outcome.label().to_string();
                report.failure = outcome.is_failure();
                match outcome {
                    CycleOutcome::AlreadyRunning => {}
                    CycleOutcome::Absent { local_height } => {
                        report.local_height = Some(*local_height);
                    }
                    CycleOutcome::Rejected {
                        candidate,
                        local_height,
                        rejection,
                        ..
                    } => {
                        report.candidate_block_id = Some(candidate.block_id);
                        report.local_height = Some(*local_height);
                        report.detail = Some(rejection.to_string());
                    }
                    CycleOutcome::Delegated {
                        candidate,
                        local_height,
                        peer,
                        result,
                    } => {
                        report.candidate_block_id = Some(candidate.block_id);
                        report.local_height = Some(*local_height);
                        report.peer = Some(peer.to_string());
                        report.detail = result.as_ref().err().map(ToString::to_string);
                    }
                }
            }
            Err(
                e @ AdmissionError::CleanupFailed {
                    candidate,
                    local_height,
                    ..
                },
            ) => {
                report.outcome = "cleanup_failed".to_string();
                report.candidate_block_id = Some(candidate.block_id);
                report.local_height = Some(*local_height);
                report.detail = Some(e.to_string());
            }
            Err(e @ AdmissionError::StoreUnavailable(_)) => {
                report.outcome = "store_error".to_string();
                report.detail = Some(e.to_string());
            }
        }
        report
    }
}

pub struct StatusTracker {
    metrics: SharedMetrics,
    last: RwLock<Option<CycleReport>>,
}

impl StatusTracker {
    pub fn new(metrics: SharedMetrics) -> Self {
        Self {
            metrics,
            last: RwLock::new(None),
        }
    }

    pub fn last_cycle(&self) -> Option<CycleReport> {
        self.last.read().clone()
    }
}

impl OutcomeObserver for StatusTracker {
    fn observe(&self, outcome: &Result<CycleOutcome, AdmissionError>) {
        self.metrics.record(outcome);

        // A skipped cycle says nothing about the queue; keep the previous report.
        if matches!(outcome, Ok(CycleOutcome::AlreadyRunning)) {
            return;
        }
        *self.last.write() = Some(CycleReport::from_result(outcome, Utc::now()));
    }
}
