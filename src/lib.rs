//! Request gate for the Agent at Work directory.
//!
//! Runs in front of page rendering on every request: bypasses static assets
//! and API routes, keeps anonymous visitors out of the protected area, sends
//! signed-in visitors from the landing page to the protected area, and
//! hardens every gated response with a fixed set of security headers.

pub mod auth;
pub mod config;
pub mod gate;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::GateConfig;
pub use gate::{gate_middleware, with_gate, Gate, GateDecision};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
