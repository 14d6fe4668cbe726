use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Query, Request, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use ltp_core::audit::{AuditRecord, AuditRequest};
use tokio_util::sync::CancellationToken;

use crate::{
    error::{ApiError, ApiResult},
    metrics::record_request,
    models::{LtpQuery, LtpResponse},
    AppState,
};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Last traded prices for a batch of pairs.
///
/// Returns 200 with every successful pair when at least one pair resolved,
/// and 503 with an empty list otherwise.
#[utoipa::path(
    get,
    path = "/api/v1/ltp",
    params(LtpQuery),
    responses(
        (status = 200, description = "Prices for every pair that resolved", body = LtpResponse),
        (status = 503, description = "No pair resolved", body = LtpResponse)
    )
)]
pub async fn get_ltp(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> ApiResult<(StatusCode, Json<LtpResponse>)> {
    let started = Instant::now();
    let headers = request.headers();

    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let audit_request = AuditRequest {
        request_id: request_id.clone(),
        method: request.method().to_string(),
        endpoint: request.uri().path().to_string(),
        pairs_requested: pairs_param(&request)?,
        client_ip: client_ip(headers, peer),
    };

    tracing::info!(
        request_id = %request_id,
        pairs = audit_request.pairs_requested.as_deref().unwrap_or(""),
        "fetching prices"
    );

    // The batch runs on its own task so that a dropped request (client gone,
    // timeout) stops further pairs through the guard while the pair already
    // in flight completes and is cached.
    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();
    let service = state.price_service.clone();
    let raw_pairs = audit_request.pairs_requested.clone();
    let result = tokio::spawn(async move { service.get_prices(raw_pairs.as_deref(), &cancel).await })
        .await
        .map_err(|e| ApiError::Internal(format!("Price batch task failed: {}", e)))?;
    guard.disarm();

    let batch_status = result.status();
    let status = StatusCode::from_u16(batch_status.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let elapsed = started.elapsed();
    let elapsed_ms = i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX);
    record_request(
        &audit_request.method,
        &audit_request.endpoint,
        status.as_u16(),
        elapsed,
    );

    tracing::info!(
        request_id = %request_id,
        status = batch_status.as_str(),
        pairs_count = result.successes.len(),
        errors_count = result.error_count,
        cache_hits = result.cache_hits(),
        upstream_calls = result.upstream_calls(),
        duration_ms = elapsed_ms,
        "prices fetched"
    );
    if let Some(message) = result.last_error_message.as_deref() {
        if result.successes.is_empty() {
            tracing::error!(request_id = %request_id, error = message, "all price fetches failed");
        }
    }

    state.audit_queue.emit(AuditRecord::from_batch(
        audit_request,
        &result,
        status.as_u16(),
        elapsed_ms,
        Utc::now(),
    ));

    Ok((status, Json(LtpResponse::from(&result))))
}

/// First `pairs` value of the query string, as sent.
fn pairs_param(request: &Request) -> ApiResult<Option<String>> {
    let Query(params) = Query::<Vec<(String, String)>>::try_from_uri(request.uri())
        .map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(params
        .into_iter()
        .find(|(key, _)| key == "pairs")
        .map(|(_, value)| value))
}

/// Client address: first `X-Forwarded-For` entry, then `X-Real-IP`, then the peer.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(first) = header("x-forwarded-for").and_then(|v| v.split(',').next()) {
        return first.trim().to_string();
    }
    if let Some(real_ip) = header("x-real-ip") {
        return real_ip.to_string();
    }
    peer.map(|addr| addr.ip().to_string()).unwrap_or_default()
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/ltp", get(get_ltp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let h = headers(&[
            ("x-forwarded-for", " 203.0.113.7 , 10.0.0.1"),
            ("x-real-ip", "198.51.100.2"),
        ]);
        assert_eq!(client_ip(&h, None), "203.0.113.7");
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip_then_peer() {
        let h = headers(&[("x-real-ip", "198.51.100.2")]);
        assert_eq!(client_ip(&h, None), "198.51.100.2");

        let peer: SocketAddr = "192.0.2.10:54321".parse().unwrap();
        assert_eq!(client_ip(&HeaderMap::new(), Some(peer)), "192.0.2.10");
        assert_eq!(client_ip(&HeaderMap::new(), None), "");
    }

    #[test]
    fn test_pairs_param_takes_first_value() {
        let request = Request::builder()
            .uri("/api/v1/ltp?pairs=BTC%2FUSD,BTC/EUR&pairs=BTC/CHF")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(
            pairs_param(&request).unwrap().as_deref(),
            Some("BTC/USD,BTC/EUR")
        );

        let request = Request::builder()
            .uri("/api/v1/ltp")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(pairs_param(&request).unwrap(), None);
    }
}
