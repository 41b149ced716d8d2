//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all forwarding handler
//! - Wire up middleware (gate, timeout, tracing, request ID)
//! - Forward requests the gate lets through to the upstream origin
//! - Serve over plain TCP or TLS with graceful shutdown

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{
        header,
        uri::{Authority, PathAndQuery, Scheme},
        Request, StatusCode, Uri, Version,
    },
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GateConfig;
use crate::gate::{with_gate, Gate, GateError};
use crate::http::request::{request_id_of, GateRequestId};

/// Hop-by-hop headers that must not be forwarded.
const HOP_BY_HOP: [header::HeaderName; 5] = [
    header::CONNECTION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("gate: {0}")]
    Gate(#[from] GateError),
    #[error("upstream origin {0:?}: {1}")]
    Upstream(String, String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("cannot build upstream URI: {0}")]
    Uri(String),
    #[error("upstream request failed: {0}")]
    Transport(String),
}

/// Origin that receives forwarded requests.
#[derive(Clone)]
pub struct Upstream {
    client: Client<HttpConnector, Body>,
    scheme: Scheme,
    authority: Authority,
}

impl Upstream {
    pub fn from_origin(origin: &str, connect_timeout: Duration) -> Result<Self, ServerError> {
        let uri: Uri = origin
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| {
                ServerError::Upstream(origin.to_string(), e.to_string())
            })?;
        if uri.scheme() != Some(&Scheme::HTTP) {
            return Err(ServerError::Upstream(
                origin.to_string(),
                "only http origins are supported".to_string(),
            ));
        }
        let authority = uri.authority().cloned().ok_or_else(|| {
            ServerError::Upstream(origin.to_string(), "origin has no authority".to_string())
        })?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            client,
            scheme: Scheme::HTTP,
            authority,
        })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Send `request` to the origin, keeping method, path, query and body.
    pub async fn forward(&self, request: Request<Body>) -> Result<Response, UpstreamError> {
        let (mut parts, body) = request.into_parts();

        let mut uri_parts = parts.uri.clone().into_parts();
        uri_parts.scheme = Some(self.scheme.clone());
        uri_parts.authority = Some(self.authority.clone());
        if uri_parts.path_and_query.is_none() {
            uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        parts.uri = Uri::from_parts(uri_parts).map_err(|e| UpstreamError::Uri(e.to_string()))?;
        parts.version = Version::HTTP_11;
        for name in &HOP_BY_HOP {
            parts.headers.remove(name);
        }

        let response: hyper::Response<Incoming> = self
            .client
            .request(Request::from_parts(parts, body))
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let (parts, body) = response.into_parts();
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// Application state injected into handlers.
#[derive(Clone, Default)]
pub struct AppState {
    pub upstream: Option<Upstream>,
}

/// HTTP server fronting the upstream origin with the gate.
pub struct HttpServer {
    router: Router,
    config: GateConfig,
    gate: Arc<Gate>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GateConfig) -> Result<Self, ServerError> {
        let gate = Arc::new(Gate::from_config(&config)?);
        Self::with_gate(config, gate)
    }

    /// Create a server around an already built gate.
    pub fn with_gate(config: GateConfig, gate: Arc<Gate>) -> Result<Self, ServerError> {
        let upstream = config
            .upstream
            .origin
            .as_deref()
            .map(|origin| {
                Upstream::from_origin(origin, Duration::from_secs(config.timeouts.connect_secs))
            })
            .transpose()?;

        let state = AppState { upstream };
        let router = Self::build_router(&config, gate.clone(), state);
        Ok(Self {
            router,
            config,
            gate,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GateConfig, gate: Arc<Gate>, state: AppState) -> Router {
        let routes = Router::new()
            .route("/", any(forward_handler))
            .route("/{*path}", any(forward_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        with_gate(routes, gate).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(GateRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
    }

    /// The fully layered router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            session_mode = self.gate.session().mode_name(),
            rules = self.gate.rules().len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server over TLS on `addr`.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            shutdown.await;
            shutdown_handle.graceful_shutdown(Some(Duration::from_secs(10)));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn gate(&self) -> &Arc<Gate> {
        &self.gate
    }
}

/// Catch-all handler.
/// Forwards to the upstream origin, or answers an empty 200 without one.
async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let Some(upstream) = state.upstream.as_ref() else {
        return StatusCode::OK.into_response();
    };

    let request_id = request_id_of(request.headers()).to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Forwarding request"
    );

    match upstream.forward(request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
