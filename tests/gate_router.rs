//! In-process tests for the layered router, no sockets involved.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::LOCATION, Request, StatusCode},
    Router,
};
use tower::ServiceExt;

use common::{assert_no_security_headers, assert_security_headers};
use request_gate::auth::{SessionResolver, SessionValidator, ValidatorError};
use request_gate::config::{validate_config, GateConfig};
use request_gate::gate::{Gate, RedirectTargets};
use request_gate::http::HttpServer;
use request_gate::routing::{GateAction, Matcher, Rule, RuleSet};
use request_gate::security::SecurityHeaders;

fn router_for(gate: Gate) -> Router {
    HttpServer::with_gate(GateConfig::default(), Arc::new(gate))
        .unwrap()
        .router()
}

fn default_router() -> Router {
    HttpServer::new(GateConfig::default()).unwrap().router()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("cookie", cookie)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_protected_without_session_redirects_to_sign_in() {
    let response = default_router()
        .oneshot(get("/protected/agents/new"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(LOCATION).unwrap(),
        "/sign-in?redirect_to=%2Fprotected%2Fagents%2Fnew"
    );
    assert_security_headers(response.headers());
}

#[tokio::test]
async fn test_protected_with_session_passes_through() {
    let response = default_router()
        .oneshot(get_with_cookie("/protected", "theme=dark; sb-access-token=abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(LOCATION).is_none());
    assert_security_headers(response.headers());
}

#[tokio::test]
async fn test_refresh_token_alone_is_session_evidence() {
    let response = default_router()
        .oneshot(get_with_cookie("/protected/settings", "sb-refresh-token=xyz"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_security_headers(response.headers());
}

#[tokio::test]
async fn test_root_with_session_redirects_to_protected() {
    let response = default_router()
        .oneshot(get_with_cookie("/", "sb-access-token=abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/protected");
    assert_security_headers(response.headers());
}

#[tokio::test]
async fn test_root_without_session_is_served() {
    let response = default_router().oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_security_headers(response.headers());
}

#[tokio::test]
async fn test_public_page_gets_headers_only() {
    let response = default_router().oneshot(get("/sign-in")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_security_headers(response.headers());
}

#[tokio::test]
async fn test_assets_and_api_bypass_without_headers() {
    for uri in [
        "/_next/static/chunks/main.js",
        "/_next/image?url=%2Flogo.png&w=64",
        "/favicon.ico",
        "/logo.png",
        "/api/agents",
        "/robots.txt",
    ] {
        let response = default_router().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_no_security_headers(response.headers());
    }
}

#[tokio::test]
async fn test_decisions_are_idempotent() {
    let router = default_router();
    let mut locations = Vec::new();

    for _ in 0..3 {
        let response = router
            .clone()
            .oneshot(get("/protected/agents"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        locations.push(response.headers().get(LOCATION).cloned());
    }

    assert!(locations.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test]
async fn test_home_redirect_can_be_disabled() {
    let mut config = GateConfig::default();
    config.gate.redirect_authenticated_home = false;
    let router = HttpServer::new(config).unwrap().router();

    let response = router
        .oneshot(get_with_cookie("/", "sb-access-token=abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_security_headers(response.headers());
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let response = default_router().oneshot(get("/sign-in")).await.unwrap();
    assert!(response.headers().get("x-request-id").is_some());
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let request = Request::builder()
        .uri("/protected")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let response = default_router().oneshot(request).await.unwrap();

    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-42");
}

#[derive(Debug)]
struct ExplodingMatcher;

impl Matcher for ExplodingMatcher {
    fn matches(&self, _path: &str) -> bool {
        panic!("matcher exploded");
    }

    fn describe(&self) -> String {
        "exploding".to_string()
    }
}

#[tokio::test]
async fn test_panicking_rule_degrades_to_pass_through() {
    let gate = Gate::new(
        RuleSet::new(vec![Rule::new(ExplodingMatcher, GateAction::Bypass)]),
        SecurityHeaders::standard(),
        SessionResolver::cookie_presence(["sb-access-token"]),
        RedirectTargets::new("/sign-in", "/protected", None, StatusCode::TEMPORARY_REDIRECT)
            .unwrap(),
    );

    let response = router_for(gate).oneshot(get("/protected")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_security_headers(response.headers());
}

#[test]
fn test_unencodable_sign_in_path_is_refused_before_serving() {
    let mut config = GateConfig::default();
    config.gate.sign_in_path = "/sign-in\u{7f}".into();

    let errors = validate_config(&config).unwrap_err();
    assert!(errors.iter().any(|e| e.field == "gate.sign_in_path"));
    assert!(HttpServer::new(config).is_err());
    assert!(
        RedirectTargets::new("/sign-in\n", "/protected", None, StatusCode::TEMPORARY_REDIRECT)
            .is_err()
    );
}

#[tokio::test]
async fn test_non_canonical_protected_paths_redirect() {
    for uri in ["/%70rotected/secret", "//protected/secret", "/protected//secret"] {
        let response = default_router().oneshot(get(uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{uri}");
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/sign-in?redirect_to=%2Fprotected%2Fsecret",
            "{uri}"
        );
        assert_security_headers(response.headers());
    }
}

#[tokio::test]
async fn test_static_files_under_protected_prefix_need_a_session() {
    for uri in ["/protected/banner.svg", "/protected/export.xml", "/protected/notes.txt"] {
        let response = default_router().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{uri}");
        assert_security_headers(response.headers());
    }

    let response = default_router()
        .oneshot(get_with_cookie("/protected/banner.svg", "sb-access-token=abc"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

struct PanickingValidator;

#[async_trait]
impl SessionValidator for PanickingValidator {
    async fn validate(&self, _token: &str) -> Result<bool, ValidatorError> {
        panic!("validator exploded");
    }
}

#[tokio::test]
async fn test_panicking_validator_counts_as_anonymous() {
    let session = SessionResolver::provider_validated(
        "sb-access-token",
        Arc::new(PanickingValidator),
        Duration::from_millis(300),
    );
    let gate = Gate::with_session(&GateConfig::default(), session).unwrap();

    let response = router_for(gate)
        .oneshot(get_with_cookie("/protected", "sb-access-token=abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(LOCATION).unwrap(),
        "/sign-in?redirect_to=%2Fprotected"
    );
    assert_security_headers(response.headers());
}
