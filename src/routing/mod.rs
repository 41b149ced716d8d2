//! Path routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → path.rs (canonical form)
//!     → rules.rs (ordered rule scan)
//!     → matcher.rs (evaluate path conditions)
//!     → Return: GateAction of first match, or PassThrough
//!
//! Rule Compilation (at startup):
//!     RuleConfig[] (or GatePolicyConfig defaults)
//!     → Compile matchers
//!     → Freeze as immutable RuleSet
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - Framework independent: rules see only the path string
//! - Deterministic: same path always resolves to the same action
//! - First match wins

pub mod matcher;
pub mod path;
pub mod rules;

pub use matcher::Matcher;
pub use path::normalize_path;
pub use rules::{GateAction, Rule, RuleSet, RuleSummary};
