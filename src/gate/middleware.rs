//! Gate middleware.
//! Runs the gate before every handler and hardens the response.
//! Requests continue under their canonical path.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::LOCATION, uri::PathAndQuery, Request, StatusCode, Uri},
    middleware::{self, Next},
    response::Response,
    Router,
};
use futures_util::FutureExt;

use crate::auth::CookieJar;
use crate::gate::{Gate, GateDecision};
use crate::observability::metrics;
use crate::routing::normalize_path;

pub async fn gate_middleware(
    State(gate): State<Arc<Gate>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = normalize_path(request.uri().path()).into_owned();
    if path != request.uri().path() {
        rewrite_path(&mut request, &path);
    }
    let jar = CookieJar::from_headers(request.headers());

    // Faults degrade to pass-through so the pipeline never sees them.
    let decision = match AssertUnwindSafe(gate.evaluate(&path, &jar))
        .catch_unwind()
        .await
    {
        Ok(Ok(decision)) => decision,
        Ok(Err(e)) => {
            tracing::error!(path = %path, error = %e, "Gate evaluation failed, passing request through");
            metrics::record_fault("error");
            GateDecision::PassThrough
        }
        Err(_) => {
            tracing::error!(path = %path, "Gate evaluation panicked, passing request through");
            metrics::record_fault("panic");
            GateDecision::PassThrough
        }
    };
    metrics::record_decision(decision.label());

    match decision {
        GateDecision::Bypass => next.run(request).await,
        GateDecision::PassThrough => {
            let mut response = next.run(request).await;
            gate.headers().apply(response.headers_mut());
            response
        }
        GateDecision::Redirect {
            location,
            status,
            reason,
        } => {
            tracing::debug!(path = %path, location = ?location, reason = ?reason, "Redirecting request");
            let mut response = Response::new(Body::empty());
            *response.status_mut() = status;
            response.headers_mut().insert(LOCATION, location);
            gate.headers().apply(response.headers_mut());
            response
        }
        GateDecision::Deny => {
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::FORBIDDEN;
            gate.headers().apply(response.headers_mut());
            response
        }
    }
}

/// Point the request at the canonical path the gate judged.
fn rewrite_path(request: &mut Request<Body>, path: &str) {
    let target = match request.uri().query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };
    let mut parts = request.uri().clone().into_parts();
    parts.path_and_query = match PathAndQuery::try_from(target) {
        Ok(path_and_query) => Some(path_and_query),
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Cannot rewrite request path");
            return;
        }
    };
    match Uri::from_parts(parts) {
        Ok(uri) => *request.uri_mut() = uri,
        Err(e) => tracing::warn!(path = %path, error = %e, "Cannot rewrite request path"),
    }
}

/// Wrap every route of `router` with the gate.
pub fn with_gate<S>(router: Router<S>, gate: Arc<Gate>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(gate, gate_middleware))
}
