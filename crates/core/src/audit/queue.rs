//! Bounded fire-and-forget audit queue.
//!
//! The response path hands records to [`AuditQueue::emit`], which never waits.
//! A single background worker drains the channel into the sink. When the
//! channel is full the record is dropped with a warning.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use super::{AuditRecord, AuditSink};

pub const DEFAULT_AUDIT_QUEUE_CAPACITY: usize = 1024;

/// Sending half of the audit channel. Cheap to clone.
#[derive(Clone)]
pub struct AuditQueue {
    tx: mpsc::Sender<AuditRecord>,
}

impl AuditQueue {
    /// Create the queue and spawn its worker on the current runtime.
    ///
    /// The worker exits once every `AuditQueue` clone has been dropped and the
    /// remaining records are written.
    pub fn spawn(sink: Arc<dyn AuditSink>, capacity: usize) -> (Self, AuditWorker) {
        let (queue, rx) = Self::channel(capacity);
        let handle = tokio::spawn(audit_worker(rx, sink));
        (queue, AuditWorker { handle })
    }

    pub(crate) fn channel(capacity: usize) -> (Self, mpsc::Receiver<AuditRecord>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Enqueue `record` without waiting. Returns false if it was dropped.
    pub fn emit(&self, record: AuditRecord) -> bool {
        match self.tx.try_send(record) {
            Ok(()) => true,
            Err(TrySendError::Full(record)) => {
                warn!(
                    "Audit queue full, dropping record for request {}",
                    record.request_id
                );
                false
            }
            Err(TrySendError::Closed(record)) => {
                warn!(
                    "Audit queue closed, dropping record for request {}",
                    record.request_id
                );
                false
            }
        }
    }
}

/// Owner of the audit worker task.
pub struct AuditWorker {
    handle: JoinHandle<()>,
}

impl AuditWorker {
    /// Wait for the worker to write every queued record and exit.
    ///
    /// The worker only exits after all `AuditQueue` clones are dropped. If
    /// `grace` runs out first the worker is aborted, queued records are lost,
    /// and this returns false.
    pub async fn drain(mut self, grace: Duration) -> bool {
        match tokio::time::timeout(grace, &mut self.handle).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                error!("Audit worker failed: {}", e);
                false
            }
            Err(_) => {
                warn!(
                    "Audit worker did not drain within {:?}, abandoning queued records",
                    grace
                );
                self.handle.abort();
                false
            }
        }
    }
}

async fn audit_worker(mut rx: mpsc::Receiver<AuditRecord>, sink: Arc<dyn AuditSink>) {
    info!("Audit worker started (sink: {})", sink.name());

    while let Some(record) = rx.recv().await {
        let request_id = record.request_id.clone();
        match sink.record(record).await {
            Ok(()) => debug!("Audit record written for request {}", request_id),
            Err(e) => warn!(
                "Failed to write audit record for request {} to {}: {}",
                request_id,
                sink.name(),
                e
            ),
        }
    }

    info!("Audit worker shutting down");
}
