//! Audit persistence.

mod model;
mod repository;

pub use model::RequestLogDB;
pub use repository::SqliteAuditSink;
