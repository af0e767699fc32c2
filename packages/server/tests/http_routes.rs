//! HTTP surface tests: auth, status codes, and response shapes.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot` against
//! mock providers and the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use audit_engine::testing::{envelope, FlakyStore, MockProvider};
use audit_engine::{
    AuditConfig, Auditor, BatchOrchestrator, Field, Finding, FindingType, GroundTruth, MemoryStore,
    ProviderAdapter, Subject,
};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use harbor_server::kernel::ServerDeps;
use harbor_server::server::{build_app, AppState};
use serde_json::Value;
use tower::ServiceExt;

const SECRET: &str = "test-secret";

fn acme() -> Subject {
    Subject::new("acme", "Acme", "acme.com", "crm")
        .with_ground_truth(GroundTruth::new().with_pricing("$29/mo"))
}

fn adapters() -> Vec<ProviderAdapter> {
    let pricing = [Finding::new(Field::Pricing, FindingType::Incorrect)];
    [
        MockProvider::new("chatgpt", "ChatGPT").with_reply(envelope(&pricing, 40)),
        MockProvider::new("claude", "Claude").with_reply(envelope(&pricing, 60)),
        MockProvider::new("perplexity", "Perplexity").with_reply(envelope(&[], 90)),
    ]
    .into_iter()
    .map(|mock| ProviderAdapter::new(Arc::new(mock), Duration::from_secs(5)))
    .collect()
}

fn app_with(store: Arc<MemoryStore>, adapters: Vec<ProviderAdapter>, secret: Option<&str>) -> Router {
    let config = AuditConfig::default().with_subject_delay(Duration::ZERO);
    let orchestrator = BatchOrchestrator::new(store.clone(), store, Auditor::new(adapters, config).unwrap());
    let deps = ServerDeps::new(Arc::new(orchestrator), vec!["chatgpt".into(), "claude".into()]);
    build_app(AppState::new(deps, secret.map(String::from)))
}

fn app() -> Router {
    app_with(Arc::new(MemoryStore::with_subjects([acme()])), adapters(), Some(SECRET))
}

fn batch_request(body: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/audits/batch")
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn batch_without_token_is_unauthorized() {
    let response = app().oneshot(batch_request("{}", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "Unauthorized");
}

#[tokio::test]
async fn batch_with_wrong_token_makes_no_provider_calls() {
    let mock = MockProvider::new("chatgpt", "ChatGPT").with_reply(envelope(&[], 80));
    let calls = mock.calls();
    let app = app_with(
        Arc::new(MemoryStore::with_subjects([acme()])),
        vec![ProviderAdapter::new(Arc::new(mock), Duration::from_secs(5))],
        Some(SECRET),
    );

    let response = app.oneshot(batch_request("{}", Some("nope"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(calls.count(), 0);
}

#[tokio::test]
async fn missing_secret_fails_closed() {
    let app = app_with(Arc::new(MemoryStore::new()), adapters(), None);
    let response = app.oneshot(batch_request("{}", Some(""))).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn batch_returns_summary() {
    let response = app()
        .oneshot(batch_request(r#"{"batch_size": 5}"#, Some(SECRET)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["processed"], 1);
    assert_eq!(body["with_issues"], 1);
    assert_eq!(body["next_offset"], 5);
    assert_eq!(body["message"], "Audited 1 subjects, 1 with issues");
    assert_eq!(body["results"][0]["consensus_issues"][0], "pricing");
    assert_eq!(
        body["results"][0]["hook"],
        "2 out of 3 AI models we tested have incorrect info about Acme's pricing."
    );
}

#[tokio::test]
async fn oversized_batch_is_bad_request() {
    let response = app()
        .oneshot(batch_request(r#"{"batch_size": 500}"#, Some(SECRET)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"]
        .as_str()
        .unwrap()
        .contains("batch_size"));
}

#[tokio::test]
async fn overflowing_offset_is_bad_request() {
    let response = app()
        .oneshot(batch_request(
            r#"{"offset": 18446744073709551615, "batch_size": 10}"#,
            Some(SECRET),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"]
        .as_str()
        .unwrap()
        .contains("offset"));
}

#[tokio::test]
async fn unreadable_subjects_are_bad_gateway() {
    let store = Arc::new(FlakyStore::new(MemoryStore::new()).failing_reads());
    let orchestrator = BatchOrchestrator::new(
        store.clone(),
        store,
        Auditor::new(adapters(), AuditConfig::default()).unwrap(),
    );
    let app = build_app(AppState::new(
        ServerDeps::new(Arc::new(orchestrator), vec![]),
        Some(SECRET.to_string()),
    ));

    let response = app.oneshot(batch_request("{}", Some(SECRET))).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(json_body(response).await["error"]
        .as_str()
        .unwrap()
        .starts_with("subjects unavailable"));
}

#[tokio::test]
async fn status_reports_stored_audits() {
    let store = Arc::new(MemoryStore::with_subjects([acme()]));
    let app = app_with(store, adapters(), Some(SECRET));

    let response = app
        .clone()
        .oneshot(batch_request("{}", Some(SECRET)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/audits/status?sample=5")
                .header("authorization", format!("Bearer {}", SECRET))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["total_audited"], 1);
    assert_eq!(body["sample_with_issues"], 1);
    assert_eq!(body["sample_with_consensus"], 1);
    assert_eq!(body["sample"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn status_requires_token() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/audits/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_is_public() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["providers_configured"], serde_json::json!(["chatgpt", "claude"]));
}
