//! Network layer subsystem.
//!
//! Plain TCP listeners are bound directly in `lifecycle::startup`; this
//! module holds what TLS termination needs.

pub mod tls;

pub use tls::load_tls_config;
