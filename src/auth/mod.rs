//! Session evidence subsystem.
//!
//! # Data Flow
//! ```text
//! Request headers
//!     → cookies.rs (parse Cookie headers into a read-only jar)
//!     → session.rs (cookie presence, or provider validation)
//!         → provider.rs (Supabase /auth/v1/user round trip, bounded by a timeout)
//!     → SessionEvidence (Authenticated | Anonymous)
//! ```
//!
//! # Design Decisions
//! - The gate only reads cookies, it never sets or clears them
//! - Exactly one evidence mode is active per process
//! - Provider failures are fail-closed: the requester is anonymous

pub mod cookies;
pub mod provider;
pub mod session;

pub use cookies::CookieJar;
pub use provider::SupabaseValidator;
pub use session::{SessionEvidence, SessionMode, SessionResolver, SessionValidator, ValidatorError};
