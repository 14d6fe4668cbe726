use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;

use super::model::RequestLogDB;
use crate::db::{get_connection, DbPool};
use crate::errors::IntoCore;
use crate::schema::request_logs::dsl as request_logs_dsl;
use ltp_core::audit::{AuditRecord, AuditSink};
use ltp_core::{Error, Result};

/// [`AuditSink`] writing one `request_logs` row per record.
///
/// Diesel is synchronous, so every call runs on the blocking pool.
pub struct SqliteAuditSink {
    pool: Arc<DbPool>,
}

impl SqliteAuditSink {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn insert(pool: &DbPool, row: &RequestLogDB) -> Result<()> {
        let mut conn = get_connection(pool)?;
        diesel::insert_into(request_logs_dsl::request_logs)
            .values(row)
            .execute(&mut conn)
            .into_core()?;
        Ok(())
    }

    /// Most recent rows first.
    pub fn list_recent(&self, limit: i64) -> Result<Vec<RequestLogDB>> {
        let mut conn = get_connection(&self.pool)?;
        request_logs_dsl::request_logs
            .select(RequestLogDB::as_select())
            .order((request_logs_dsl::created_at.desc(), request_logs_dsl::id.desc()))
            .limit(limit)
            .load::<RequestLogDB>(&mut conn)
            .into_core()
    }
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Unexpected(format!("Blocking task failed: {}", e)))?
}

#[async_trait]
impl AuditSink for SqliteAuditSink {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn record(&self, record: AuditRecord) -> Result<()> {
        let pool = Arc::clone(&self.pool);
        let row = RequestLogDB::from(&record);
        blocking(move || Self::insert(&pool, &row)).await
    }

    async fn ping(&self) -> Result<()> {
        let pool = Arc::clone(&self.pool);
        blocking(move || {
            let mut conn = get_connection(&pool)?;
            diesel::sql_query("SELECT 1").execute(&mut conn).into_core()?;
            Ok(())
        })
        .await
    }
}
