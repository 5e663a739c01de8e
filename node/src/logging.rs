//! Subscriber setup for the node binary.
//!
//! Admission decisions are logged as structured events (candidate, origin,
//! reason), so the JSON format is what log shippers should consume. Logs go
//! to stderr; `inspect` and `version` print their reports on stdout.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Info for both crates: one event per rejection or delegation, idle
/// cycles only at debug.
pub const DEFAULT_FILTER: &str = "blockgate_node=info,blockgate_protocol=info";

/// Value of `log_format` in `blockgate.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Colored, with file and line of each event.
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Anything other than `json` (any case) falls back to `Pretty`, so a
    /// typo in the config never stops the node from starting.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Installs the global subscriber. Each subcommand calls this once before
/// touching the store; a second call panics.
///
/// `RUST_LOG` replaces `default_filter` when set, e.g.
/// `RUST_LOG=blockgate_protocol=debug` to see every idle cycle.
pub fn init_logging(default_filter: &str, format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(true),
                )
                .init();
        }
    }

    tracing::debug!(?format, "log subscriber installed");
}
