use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::{models::ReadinessResponse, AppState};

#[utoipa::path(get, path = "/api/v1/healthz", responses((status = 200, description = "Health")))]
pub async fn healthz() -> &'static str {
    "ok"
}

/// Ready when the audit database (if any) and the price cache answer a ping.
#[utoipa::path(
    get,
    path = "/api/v1/readyz",
    responses(
        (status = 200, description = "Ready", body = ReadinessResponse),
        (status = 503, description = "A dependency is unavailable", body = ReadinessResponse)
    )
)]
pub async fn readyz(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ReadinessResponse>) {
    if let Err(e) = state.audit_sink.ping().await {
        tracing::warn!("Readiness: {} sink ping failed: {}", state.audit_sink.name(), e);
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse::not_ready("database unavailable")),
        );
    }

    if let Some(Err(e)) = state.price_service.cache_health().await {
        tracing::warn!("Readiness: cache ping failed: {}", e);
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse::not_ready("cache unavailable")),
        );
    }

    (StatusCode::OK, Json(ReadinessResponse::ready()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}
