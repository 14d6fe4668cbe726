//! Audit sink trait and implementations.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::info;

use super::AuditRecord;
use crate::errors::{Error, Result};

/// Destination for audit records.
///
/// Called only from the audit worker, never on the response path, so an
/// implementation may perform blocking I/O on a blocking thread.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Persist one record.
    async fn record(&self, record: AuditRecord) -> Result<()>;

    /// Liveness check for readiness.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Writes each record as a structured log line under the `audit` target.
#[derive(Clone, Default)]
pub struct LogAuditSink;

#[async_trait]
impl AuditSink for LogAuditSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn record(&self, record: AuditRecord) -> Result<()> {
        let line = serde_json::to_string(&record).map_err(|e| Error::Unexpected(e.to_string()))?;
        info!(target: "audit", "{}", line);
        Ok(())
    }
}

/// Mock sink for testing - collects recorded entries.
#[derive(Clone, Default)]
pub struct MockAuditSink {
    records: Arc<Mutex<Vec<AuditRecord>>>,
}

impl MockAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected records.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AuditSink for MockAuditSink {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn record(&self, record: AuditRecord) -> Result<()> {
        self.records
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(record);
        Ok(())
    }
}
