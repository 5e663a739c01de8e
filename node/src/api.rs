//! # HTTP Status API
//!
//! Builds the axum router that exposes the node's read-only HTTP interface.
//! All endpoints share application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path      | Description                                     |
//! |--------|-----------|-------------------------------------------------|
//! | GET    | `/health` | Liveness probe                                  |
//! | GET    | `/status` | Chain tip, queued candidate, last cycle summary |

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use blockgate_protocol::admission::AdmissionController;
use blockgate_protocol::storage::{ChainDb, ChainHeight, SyncCandidate};

use crate::status::{CycleReport, StatusTracker};

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone: everything behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The node's reported version string.
    pub version: String,
    pub db: Arc<ChainDb>,
    /// Source of the node id and of whether a cycle is in flight.
    pub controller: Arc<AdmissionController>,
    pub status: Arc<StatusTracker>,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the axum [`Router`] with request tracing.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Response payload for `GET /status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Node software version.
    pub version: String,
    pub protocol_version: String,
    pub node_id: i64,
    /// Whether an admission cycle is running right now.
    pub cycle_running: bool,
    /// Local chain tip, if one has been recorded.
    pub chain_tip: Option<BlockRef>,
    /// Candidate currently waiting in the queue.
    pub queued: Option<QueuedCandidate>,
    pub last_cycle: Option<CycleReport>,
    /// ISO-8601 timestamp of the response.
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BlockRef {
    pub block_id: u64,
    /// Hex-encoded block hash.
    pub block_hash: String,
}

impl From<&ChainHeight> for BlockRef {
    fn from(height: &ChainHeight) -> Self {
        Self {
            block_id: height.block_id,
            block_hash: height.hash_hex(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct QueuedCandidate {
    pub block_id: u64,
    pub block_hash: String,
    pub origin_node_id: i64,
}

impl From<&SyncCandidate> for QueuedCandidate {
    fn from(candidate: &SyncCandidate) -> Self {
        Self {
            block_id: candidate.block_id,
            block_hash: candidate.hash_hex(),
            origin_node_id: candidate.origin_node_id,
        }
    }
}

/// Generic error body returned on failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health` returns 200 while the process is up.
///
/// Does not touch the store; that belongs in `/status`.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// `GET /status` reads the tip and queue slot straight from the store.
async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let store_view = state
        .db
        .get_chain_height()
        .and_then(|tip| Ok((tip, state.db.get_candidate()?)));

    let (tip, queued) = match store_view {
        Ok(view) => view,
        Err(e) => {
            tracing::error!("status: failed to read store: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    let resp = StatusResponse {
        version: state.version.clone(),
        protocol_version: blockgate_protocol::config::PROTOCOL_VERSION.to_string(),
        node_id: state.controller.self_node_id(),
        cycle_running: state.controller.is_running(),
        chain_tip: tip.as_ref().map(BlockRef::from),
        queued: queued
            .as_ref()
            .filter(|c| !c.is_empty())
            .map(QueuedCandidate::from),
        last_cycle: state.status.last_cycle(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    (StatusCode::OK, Json(resp)).into_response()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
