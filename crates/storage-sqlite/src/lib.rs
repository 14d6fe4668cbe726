//! SQLite audit storage for the LTP service.
//!
//! This crate is the only place in the service where Diesel dependencies exist.
//! It provides:
//! - Database initialization, connection pooling and embedded migrations
//! - [`SqliteAuditSink`], the `AuditSink` implementation backed by `request_logs`
//! - Database-specific row types (with Diesel derives)
//!
//! ```text
//! ltp-core (AuditQueue) ──> AuditSink
//!                               │
//!                               ▼
//!                 storage-sqlite (this crate)
//!                               │
//!                               ▼
//!                           SQLite DB
//! ```

pub mod audit;
pub mod db;
pub mod errors;
pub mod schema;

pub use audit::{RequestLogDB, SqliteAuditSink};
pub use db::{create_pool, get_connection, init, run_migrations, DbConnection, DbPool};
pub use errors::{IntoCore, StorageError};

pub use ltp_core::errors::{DatabaseError, Error, Result};
