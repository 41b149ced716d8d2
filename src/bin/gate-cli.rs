use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use request_gate::auth::CookieJar;
use request_gate::config::load_or_default;
use request_gate::gate::{Gate, GateDecision};
use request_gate::routing::normalize_path;

#[derive(Parser)]
#[command(name = "gate-cli")]
#[command(about = "Inspect request gate decisions offline", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the gate for one request
    Check {
        /// Request path, e.g. /protected/settings
        #[arg(long)]
        path: String,

        /// Cookie sent with the request, as NAME=VALUE (repeatable)
        #[arg(long = "cookie", value_parser = parse_cookie)]
        cookies: Vec<(String, String)>,
    },
    /// Print the effective ordered rule set
    Rules,
}

fn parse_cookie(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(name, _)| !name.trim().is_empty())
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got {raw:?}"))
}

/// JSON report for one `check` run.
fn check_report(gate: &Gate, path: &str, decision: &GateDecision) -> Value {
    let headers: Vec<_> = if *decision == GateDecision::Bypass {
        Vec::new()
    } else {
        gate.headers()
            .iter()
            .map(|(name, value)| {
                json!({ "name": name.as_str(), "value": value.to_str().unwrap_or_default() })
            })
            .collect()
    };

    json!({
        "path": path,
        "canonical_path": normalize_path(path),
        "session_mode": gate.session().mode_name(),
        "decision": decision.label(),
        "status": decision.status().map(|status| status.as_u16()),
        "location": decision.location(),
        "headers": headers,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;
    let gate = Gate::from_config(&config)?;

    match cli.command {
        Commands::Check { path, cookies } => {
            let jar: CookieJar = cookies.into_iter().collect();
            let decision = gate.evaluate(&path, &jar).await?;
            let report = check_report(&gate, &path, &decision);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Rules => {
            println!("{}", serde_json::to_string_pretty(&gate.rules().summaries())?);
        }
    }

    Ok(())
}
