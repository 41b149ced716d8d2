//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! gate::middleware     → decision counters, fault counters, error logs
//! auth::session        → validation counters + latency, warn logs
//! http::server         → TraceLayer spans keyed by x-request-id
//!
//! logging.rs  → EnvFilter subscriber on stdout
//! metrics.rs  → Prometheus scrape endpoint (only when enabled)
//! ```
//!
//! Recording never fails a request: with no exporter installed the
//! metric macros are no-ops.

pub mod logging;
pub mod metrics;
