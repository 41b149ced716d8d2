//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing gated response (pass-through, redirect, upstream error):
//!     → headers.rs (merge the fixed hardening header set)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - One header set per process, never mutated after startup
//! - Bypassed asset responses are left untouched

pub mod headers;

pub use headers::{HeaderSetError, SecurityHeaders, STANDARD_HEADERS};
