//! Request gate edge server.
//!
//! ```text
//! Client ─▶ request id ─▶ trace ─▶ gate ─┬─ redirect ──────────────────────────▶ Client
//!                                        └─ bypass / pass-through
//!                                              ─▶ timeout ─▶ forward ─▶ Upstream origin
//! Response ◀─ security headers (unless bypassed) ◀──────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use request_gate::config::load_or_default;
use request_gate::lifecycle::startup;
use request_gate::observability::logging;

#[derive(Parser)]
#[command(name = "request-gate")]
#[command(about = "Edge gate for the Agent at Work directory", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_or_default(args.config.as_deref())?;

    logging::init(&config.observability.log_level);
    tracing::info!("request-gate v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
