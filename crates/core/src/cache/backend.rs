use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a cache backend.
///
/// None of these ever fail a price lookup: [`PriceCache`](super::PriceCache)
/// turns read errors into misses and the coordinator logs write errors.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The backend could not be reached or refused the command.
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// The backend did not answer within the operation budget.
    #[error("Cache {operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// A stored value could not be encoded or decoded.
    #[error("Cache codec error: {0}")]
    Codec(String),
}

/// Remote key-value store used by the price cache.
///
/// Per-key operations are expected to be atomic at the backend, so callers
/// take no locks of their own. Implementations must never block beyond a
/// bounded round-trip.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short name for logs, e.g. "redis".
    fn name(&self) -> &'static str;

    /// Read `key`. A missing key is `Ok(None)`, distinct from an error.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key`, evicted by the backend after `ttl`.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Cheap liveness check used by readiness.
    async fn ping(&self) -> Result<(), CacheError>;
}
