//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::OriginalUri,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use request_gate::config::GateConfig;
use request_gate::gate::Gate;
use request_gate::http::HttpServer;
use request_gate::lifecycle::Shutdown;
use tokio::net::TcpListener;

pub const SECURITY_HEADERS: [(&str, &str); 5] = [
    ("x-frame-options", "DENY"),
    ("x-content-type-options", "nosniff"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("x-xss-protection", "1; mode=block"),
    ("strict-transport-security", "max-age=31536000; includeSubDomains"),
];

pub const VALID_TOKEN: &str = "valid-access-token";
pub const ANON_KEY: &str = "test-anon-key";

/// Assert every security header is present with its exact value.
#[allow(dead_code)]
pub fn assert_security_headers(headers: &HeaderMap) {
    for (name, value) in SECURITY_HEADERS {
        assert_eq!(
            headers.get(name).and_then(|v| v.to_str().ok()),
            Some(value),
            "header {name}"
        );
    }
}

/// Assert none of the security headers were added.
#[allow(dead_code)]
pub fn assert_no_security_headers(headers: &HeaderMap) {
    for (name, _) in SECURITY_HEADERS {
        assert!(headers.get(name).is_none(), "unexpected header {name}");
    }
}

async fn spawn(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// Start a mock origin that echoes the requested path and query.
#[allow(dead_code)]
pub async fn start_mock_origin() -> SocketAddr {
    let router = Router::new().fallback(|OriginalUri(uri): OriginalUri| async move {
        format!("origin:{uri}")
    });
    spawn(router).await
}

/// Start a mock Supabase auth provider that accepts only `VALID_TOKEN`.
#[allow(dead_code)]
pub async fn start_mock_provider() -> SocketAddr {
    let router = Router::new().route(
        "/auth/v1/user",
        get(|headers: HeaderMap| async move {
            let apikey = headers.get("apikey").and_then(|v| v.to_str().ok());
            let bearer = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "));

            if apikey != Some(ANON_KEY) {
                return StatusCode::BAD_REQUEST.into_response();
            }
            match bearer {
                Some(VALID_TOKEN) => Json(serde_json::json!({ "id": "user-1" })).into_response(),
                Some("slow-token") => {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    Json(serde_json::json!({ "id": "user-2" })).into_response()
                }
                Some("broken-token") => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
                _ => StatusCode::UNAUTHORIZED.into_response(),
            }
        }),
    );
    spawn(router).await
}

/// Start the gate server on an ephemeral port.
#[allow(dead_code)]
pub async fn start_gate(config: GateConfig) -> (SocketAddr, Shutdown) {
    let gate = Arc::new(Gate::from_config(&config).unwrap());
    start_gate_with(config, gate).await
}

/// Start the gate server around a prebuilt gate.
#[allow(dead_code)]
pub async fn start_gate_with(config: GateConfig, gate: Arc<Gate>) -> (SocketAddr, Shutdown) {
    let shutdown = Shutdown::new();
    let server = HttpServer::with_gate(config, gate).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.signalled();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// HTTP client that reports redirects instead of following them.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
