//! Cache-then-upstream price coordinator.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use metrics::counter;
use ltp_market_data::{CurrencyPair, QuoteSource};
use tokio_util::sync::CancellationToken;

use super::model::{BatchResult, FetchOutcome, PairPrice, PriceSource};
use super::resolver::resolve_currencies;
use crate::cache::{CacheError, PriceCache};
use crate::metrics::{
    CACHE_HITS_TOTAL, CACHE_MISSES_TOTAL, UPSTREAM_CALLS_TOTAL, UPSTREAM_ERRORS_TOTAL,
};

/// Price lookups for single pairs and batches.
#[async_trait]
pub trait PriceServiceTrait: Send + Sync {
    /// Resolve one currency against the tracked base asset.
    async fn get_price(&self, currency: &str) -> FetchOutcome;

    /// Resolve a raw `pairs` parameter and price every resolved currency in
    /// order. Stops before the next pair once `cancel` fires.
    async fn get_prices(&self, raw_pairs: Option<&str>, cancel: &CancellationToken)
        -> BatchResult;

    /// Ping the cache backend. `None` when no backend is configured.
    async fn cache_health(&self) -> Option<Result<(), CacheError>>;
}

pub struct PriceService {
    cache: PriceCache,
    source: Arc<dyn QuoteSource>,
}

impl PriceService {
    pub fn new(cache: PriceCache, source: Arc<dyn QuoteSource>) -> Self {
        Self { cache, source }
    }

    async fn fetch_pair(&self, pair: CurrencyPair) -> FetchOutcome {
        if let Some(cached) = self.cache.get(&pair).await {
            if self.cache.is_fresh(&cached) {
                debug!("Cache hit for {}", pair);
                counter!(CACHE_HITS_TOTAL).increment(1);
                return FetchOutcome::Success(PairPrice {
                    pair,
                    amount: cached.price,
                    source: PriceSource::Cache,
                });
            }
            debug!("Cache entry for {} is stale", pair);
        }
        counter!(CACHE_MISSES_TOTAL).increment(1);

        counter!(UPSTREAM_CALLS_TOTAL).increment(1);
        match self.source.get_latest_price(&pair).await {
            Ok(amount) => {
                if let Err(e) = self.cache.put(&pair, amount, self.cache.now()).await {
                    warn!("Failed to cache price for {}: {}", pair, e);
                }
                FetchOutcome::Success(PairPrice {
                    pair,
                    amount,
                    source: PriceSource::Upstream,
                })
            }
            Err(reason) => {
                counter!(UPSTREAM_ERRORS_TOTAL, "kind" => reason.kind()).increment(1);
                warn!(
                    "Price fetch for {} failed via {} ({}): {}",
                    pair,
                    self.source.id(),
                    reason.kind(),
                    reason
                );
                FetchOutcome::Failure { pair, reason }
            }
        }
    }
}

#[async_trait]
impl PriceServiceTrait for PriceService {
    async fn get_price(&self, currency: &str) -> FetchOutcome {
        self.fetch_pair(CurrencyPair::new(currency)).await
    }

    async fn get_prices(
        &self,
        raw_pairs: Option<&str>,
        cancel: &CancellationToken,
    ) -> BatchResult {
        let currencies = resolve_currencies(raw_pairs);
        let mut outcomes = Vec::with_capacity(currencies.len());

        for currency in &currencies {
            if cancel.is_cancelled() {
                debug!(
                    "Batch cancelled after {} of {} pairs",
                    outcomes.len(),
                    currencies.len()
                );
                break;
            }
            outcomes.push(self.fetch_pair(CurrencyPair::new(currency.as_str())).await);
        }

        BatchResult::from_outcomes(outcomes, currencies.len())
    }

    async fn cache_health(&self) -> Option<Result<(), CacheError>> {
        self.cache.ping().await
    }
}
