//! Database model for request audit rows.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ltp_core::audit::AuditRecord;

/// Database model for `request_logs`.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[diesel(table_name = crate::schema::request_logs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct RequestLogDB {
    pub id: String,
    pub request_id: String,
    pub method: String,
    pub endpoint: String,
    pub pairs_requested: Option<String>,
    pub user_ip: String,
    pub status_code: i32,
    pub response_time_ms: i64,
    pub resolved_count: i32,
    pub success_count: i32,
    pub error_count: i32,
    pub cache_hit: bool,
    pub upstream_calls: i32,
    pub error_occurred: bool,
    pub error_message: Option<String>,
    pub created_at: String,
}

fn count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

impl From<&AuditRecord> for RequestLogDB {
    fn from(record: &AuditRecord) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            request_id: record.request_id.clone(),
            method: record.method.clone(),
            endpoint: record.endpoint.clone(),
            pairs_requested: record.pairs_requested.clone(),
            user_ip: record.client_ip.clone(),
            status_code: i32::from(record.status_code),
            response_time_ms: record.response_time_ms,
            resolved_count: count(record.resolved_count),
            success_count: count(record.success_count),
            error_count: count(record.error_count),
            cache_hit: record.cache_hit,
            upstream_calls: count(record.upstream_calls),
            error_occurred: record.error_occurred,
            error_message: record.error_message.clone(),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}
