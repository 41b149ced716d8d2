//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → request.rs (assign x-request-id)
//!     → trace layer
//!     → gate middleware (bypass / redirect / pass-through + headers)
//!     → timeout layer
//!     → server.rs forward handler → upstream origin
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{request_id_of, GateRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError, Upstream, UpstreamError};
