mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use common::{app_with, body_json, build_app, FakeSource};
use ltp_core::audit::{AuditRecord, AuditSink, MockAuditSink};
use ltp_core::cache::{CacheBackend, CacheError};
use ltp_core::{DatabaseError, Error};
use serde_json::json;
use tower::ServiceExt;

struct DownBackend;

#[async_trait]
impl CacheBackend for DownBackend {
    fn name(&self) -> &'static str {
        "down"
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Err(CacheError::Timeout {
            operation: "PING",
            after: Duration::from_millis(250),
        })
    }
}

struct DownSink;

#[async_trait]
impl AuditSink for DownSink {
    fn name(&self) -> &'static str {
        "down"
    }

    async fn record(&self, _record: AuditRecord) -> ltp_core::Result<()> {
        Err(Error::Database(DatabaseError::ConnectionFailed(
            "disk I/O error".to_string(),
        )))
    }

    async fn ping(&self) -> ltp_core::Result<()> {
        Err(Error::Database(DatabaseError::ConnectionFailed(
            "disk I/O error".to_string(),
        )))
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn healthz_is_ok() {
    let app = app_with(FakeSource::new(&[]));

    let response = app.router.oneshot(get("/api/v1/healthz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn readyz_reports_ready() {
    let app = app_with(FakeSource::new(&[]));

    let response = app.router.oneshot(get("/api/v1/readyz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"status": "ready"}));
}

#[tokio::test]
async fn readyz_reports_cache_unavailable() {
    let audit = MockAuditSink::new();
    let backend: Arc<dyn CacheBackend> = Arc::new(DownBackend);
    let app = build_app(
        FakeSource::new(&[]),
        Some(backend),
        Arc::new(audit.clone()),
        audit,
    );

    let response = app.router.oneshot(get("/api/v1/readyz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body_json(response).await,
        json!({"status": "not ready", "error": "cache unavailable"})
    );
}

#[tokio::test]
async fn readyz_checks_database_before_cache() {
    let backend: Arc<dyn CacheBackend> = Arc::new(DownBackend);
    let app = build_app(
        FakeSource::new(&[]),
        Some(backend),
        Arc::new(DownSink),
        MockAuditSink::new(),
    );

    let response = app.router.oneshot(get("/api/v1/readyz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body_json(response).await,
        json!({"status": "not ready", "error": "database unavailable"})
    );
}

#[tokio::test]
async fn readyz_without_cache_is_ready() {
    let audit = MockAuditSink::new();
    let app = build_app(FakeSource::new(&[]), None, Arc::new(audit.clone()), audit);

    let response = app.router.oneshot(get("/api/v1/readyz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn openapi_document_lists_routes() {
    let app = app_with(FakeSource::new(&[]));

    let response = app.router.oneshot(get("/openapi.json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    for path in ["/api/v1/ltp", "/api/v1/healthz", "/api/v1/readyz"] {
        assert!(doc["paths"].get(path).is_some(), "missing {}", path);
    }
}
