//! # Prometheus Metrics
//!
//! Exposes admission metrics for the node. Scraped by Prometheus at the
//! `/metrics` HTTP endpoint on the configured metrics port.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] so they
//! do not collide with any default global registry consumers.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

use blockgate_protocol::admission::{AdmissionError, CycleOutcome};

/// Holds all Prometheus metric handles for the node.
///
/// Clone-friendly (prometheus handles are `Arc`s internally) so it can be
/// shared between the daemon observer and the HTTP handler.
#[derive(Clone)]
pub struct NodeMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Every cycle the daemon ran, whatever the outcome.
    pub admission_cycles_total: IntCounter,
    /// Cycles that found another cycle still running.
    pub admission_skipped_total: IntCounter,
    /// Cycles that found nothing queued.
    pub candidates_absent_total: IntCounter,
    /// Rejected candidates, labelled by reason.
    pub candidates_rejected_total: IntCounterVec,
    /// Candidates handed to the chain updater.
    pub syncs_delegated_total: IntCounter,
    /// Delegations where the updater reported an error.
    pub sync_failures_total: IntCounter,
    /// Cycles aborted by a store error.
    pub store_errors_total: IntCounter,
    /// Local chain tip read by the latest cycle that reached the store.
    pub local_block_height: IntGauge,
}

impl NodeMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("blockgate".into()), None)?;

        let admission_cycles_total = IntCounter::new(
            "admission_cycles_total",
            "Total number of admission cycles run by the queue daemon",
        )?;
        registry.register(Box::new(admission_cycles_total.clone()))?;

        let admission_skipped_total = IntCounter::new(
            "admission_skipped_total",
            "Cycles skipped because a previous cycle was still running",
        )?;
        registry.register(Box::new(admission_skipped_total.clone()))?;

        let candidates_absent_total = IntCounter::new(
            "candidates_absent_total",
            "Cycles that found the block queue empty",
        )?;
        registry.register(Box::new(candidates_absent_total.clone()))?;

        let candidates_rejected_total = IntCounterVec::new(
            Opts::new(
                "candidates_rejected_total",
                "Queued candidates turned away, by reason",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(candidates_rejected_total.clone()))?;

        let syncs_delegated_total = IntCounter::new(
            "syncs_delegated_total",
            "Candidates handed to the chain updater",
        )?;
        registry.register(Box::new(syncs_delegated_total.clone()))?;

        let sync_failures_total = IntCounter::new(
            "sync_failures_total",
            "Chain updater calls that returned an error",
        )?;
        registry.register(Box::new(sync_failures_total.clone()))?;

        let store_errors_total = IntCounter::new(
            "store_errors_total",
            "Admission cycles aborted by a storage error",
        )?;
        registry.register(Box::new(store_errors_total.clone()))?;

        let local_block_height = IntGauge::new(
            "local_block_height",
            "Local chain tip seen by the latest admission cycle",
        )?;
        registry.register(Box::new(local_block_height.clone()))?;

        Ok(Self {
            registry,
            admission_cycles_total,
            admission_skipped_total,
            candidates_absent_total,
            candidates_rejected_total,
            syncs_delegated_total,
            sync_failures_total,
            store_errors_total,
            local_block_height,
        })
    }

    /// Count one cycle result.
    pub fn record(&self, outcome: &Result<CycleOutcome, AdmissionError>) {
        self.admission_cycles_total.inc();

        match outcome {
            Ok(CycleOutcome::AlreadyRunning) => self.admission_skipped_total.inc(),
            Ok(CycleOutcome::Absent { local_height }) => {
                self.candidates_absent_total.inc();
                self.local_block_height.set(gauge_value(*local_height));
            }
            Ok(CycleOutcome::Rejected {
                rejection,
                local_height,
                ..
            }) => {
                self.candidates_rejected_total
                    .with_label_values(&[rejection.reason()])
                    .inc();
                self.local_block_height.set(gauge_value(*local_height));
            }
            Ok(CycleOutcome::Delegated {
                result,
                local_height,
                ..
            }) => {
                self.syncs_delegated_total.inc();
                if result.is_err() {
                    self.sync_failures_total.inc();
                }
                self.local_block_height.set(gauge_value(*local_height));
            }
            Err(AdmissionError::CleanupFailed {
                rejection,
                local_height,
                ..
            }) => {
                self.candidates_rejected_total
                    .with_label_values(&[rejection.reason()])
                    .inc();
                self.store_errors_total.inc();
                self.local_block_height.set(gauge_value(*local_height));
            }
            Err(AdmissionError::StoreUnavailable(_)) => self.store_errors_total.inc(),
        }
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

fn gauge_value(height: u64) -> i64 {
    i64::try_from(height).unwrap_or(i64::MAX)
}

/// Shared metrics state passed to axum handlers.
pub type SharedMetrics = Arc<NodeMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
///
/// Returns HTTP 500 if encoding fails.
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
