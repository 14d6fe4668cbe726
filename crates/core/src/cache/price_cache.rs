use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use ltp_market_data::CurrencyPair;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::backend::{CacheBackend, CacheError};
use crate::time::Clock;

/// Maximum age, in seconds, of a cached price that may still be served.
pub const DEFAULT_FRESHNESS_WINDOW_SECS: i64 = 60;

/// Value stored under a pair's cache key.
///
/// The price is kept as a decimal string so it round-trips without loss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedQuote {
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub observed_at: DateTime<Utc>,
}

impl CachedQuote {
    pub fn new(price: Decimal, observed_at: DateTime<Utc>) -> Self {
        Self { price, observed_at }
    }

    /// Fresh iff strictly younger than `window`. An entry observed in the
    /// future (clock skew between writers) counts as fresh.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now.signed_duration_since(self.observed_at) < window
    }
}

/// Logical freshness layer over an optional [`CacheBackend`].
///
/// With no backend configured every lookup is a miss and every write is a
/// no-op, which degrades the service to always asking upstream.
#[derive(Clone)]
pub struct PriceCache {
    backend: Option<Arc<dyn CacheBackend>>,
    clock: Arc<dyn Clock>,
    window: Duration,
}

impl PriceCache {
    pub fn new(
        backend: Option<Arc<dyn CacheBackend>>,
        clock: Arc<dyn Clock>,
        window: Duration,
    ) -> Self {
        Self {
            backend,
            clock,
            window,
        }
    }

    pub fn disabled(clock: Arc<dyn Clock>) -> Self {
        Self::new(None, clock, Duration::seconds(DEFAULT_FRESHNESS_WINDOW_SECS))
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Look up the entry for `pair`.
    ///
    /// Returns whatever is stored, fresh or not; callers decide with
    /// [`PriceCache::is_fresh`]. Backend errors and undecodable values are
    /// reported as a miss.
    pub async fn get(&self, pair: &CurrencyPair) -> Option<CachedQuote> {
        let backend = self.backend.as_ref()?;
        let key = pair.cache_key();

        let raw = match backend.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Cache read for {} failed on {}: {}", key, backend.name(), e);
                return None;
            }
        };

        match serde_json::from_str::<CachedQuote>(&raw) {
            Ok(quote) => Some(quote),
            Err(e) => {
                warn!("Ignoring undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Whether `quote` may be served now.
    pub fn is_fresh(&self, quote: &CachedQuote) -> bool {
        quote.is_fresh(self.clock.now(), self.window)
    }

    /// Store `price` for `pair`, observed at `observed_at`.
    ///
    /// The backend evicts the entry after the freshness window.
    pub async fn put(
        &self,
        pair: &CurrencyPair,
        price: Decimal,
        observed_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        let Some(backend) = self.backend.as_ref() else {
            return Ok(());
        };

        let key = pair.cache_key();
        let value = serde_json::to_string(&CachedQuote::new(price, observed_at))
            .map_err(|e| CacheError::Codec(e.to_string()))?;
        let ttl = self.window.to_std().unwrap_or_default();

        backend.set_ex(&key, &value, ttl).await?;
        debug!("Cached {} = {} (ttl {:?})", key, price, ttl);
        Ok(())
    }

    /// Ping the backend. `None` when no backend is configured.
    pub async fn ping(&self) -> Option<Result<(), CacheError>> {
        match self.backend.as_ref() {
            Some(backend) => Some(backend.ping().await),
            None => None,
        }
    }
}
