//! # Protocol Configuration & Constants
//!
//! Every default the admission pipeline relies on lives here. The node binary
//! layers its TOML config on top of these; the library itself never reads a
//! file.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// Library version string reported by the node's `/status` endpoint.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Admission Parameters
// ---------------------------------------------------------------------------

/// Default rollback-depth limit. A queued candidate more than this many
/// blocks ahead of the local tip is discarded instead of chased.
pub const DEFAULT_ROLLBACK_LIMIT: u64 = 60;

/// How often the queue daemon runs an admission cycle.
pub const QUEUE_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Same as [`QUEUE_CHECK_INTERVAL`], for config files that want a `u64`.
/// Keep the two in sync.
pub const QUEUE_CHECK_INTERVAL_MS: u64 = 1_000;

// ---------------------------------------------------------------------------
// Network Parameters
// ---------------------------------------------------------------------------

/// Port appended to honor-node hosts that are configured without one.
pub const DEFAULT_TCP_PORT: u16 = 7078;

/// Default port for the node's HTTP status API.
pub const DEFAULT_API_PORT: u16 = 7079;

/// Default port for the Prometheus metrics endpoint.
pub const DEFAULT_METRICS_PORT: u16 = 7080;
