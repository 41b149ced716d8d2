//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter when enabled
//! - Compile the gate and build the HTTP server
//! - Bind the listener (plain or TLS) and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last, so traffic only arrives once the gate is ready

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::GateConfig;
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::{signals, Shutdown};
use crate::net::tls::load_tls_config;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid bind address {0:?}")]
    BindAddress(String),
    #[error("metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
    #[error("TLS: {0}")]
    Tls(std::io::Error),
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the gate until a termination signal arrives.
pub async fn run(config: GateConfig) -> Result<(), StartupError> {
    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());
    serve(config, shutdown).await
}

/// Run the gate until `shutdown` is triggered.
pub async fn serve(config: GateConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::BindAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let addr: SocketAddr = config
        .listener
        .bind_address
        .parse()
        .map_err(|_| StartupError::BindAddress(config.listener.bind_address.clone()))?;

    tracing::info!(
        bind_address = %addr,
        upstream = config.upstream.origin.as_deref().unwrap_or("none"),
        protected_prefix = %config.gate.protected_prefix,
        session_mode = ?config.session.mode,
        "Configuration loaded"
    );

    let tls = config.listener.tls.clone();
    let server = HttpServer::new(config)?;

    match tls {
        Some(tls) => {
            let rustls = load_tls_config(&tls).await.map_err(StartupError::Tls)?;
            server.run_tls(addr, rustls, shutdown.signalled()).await?;
        }
        None => {
            let listener = TcpListener::bind(addr).await?;
            server.run(listener, shutdown.signalled()).await?;
        }
    }
    Ok(())
}
