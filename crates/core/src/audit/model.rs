use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::prices::BatchResult;

/// What the HTTP layer knows about a request before the batch runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRequest {
    pub request_id: String,
    pub method: String,
    pub endpoint: String,
    /// Raw `pairs` parameter as received, if any.
    pub pairs_requested: Option<String>,
    pub client_ip: String,
}

/// One audit row per batch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub request_id: String,
    pub method: String,
    pub endpoint: String,
    pub pairs_requested: Option<String>,
    pub client_ip: String,
    pub status_code: u16,
    pub response_time_ms: i64,
    pub resolved_count: usize,
    pub success_count: usize,
    pub error_count: usize,
    /// True when every served price came from the cache.
    pub cache_hit: bool,
    pub upstream_calls: usize,
    pub error_occurred: bool,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn from_batch(
        request: AuditRequest,
        result: &BatchResult,
        status_code: u16,
        response_time_ms: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        let upstream_calls = result.upstream_calls();
        Self {
            request_id: request.request_id,
            method: request.method,
            endpoint: request.endpoint,
            pairs_requested: request.pairs_requested,
            client_ip: request.client_ip,
            status_code,
            response_time_ms,
            resolved_count: result.resolved_count,
            success_count: result.successes.len(),
            error_count: result.error_count,
            cache_hit: upstream_calls == 0 && !result.successes.is_empty(),
            upstream_calls,
            error_occurred: result.error_count > 0 || status_code >= 500,
            error_message: result.last_error_message.clone(),
            created_at,
        }
    }
}
