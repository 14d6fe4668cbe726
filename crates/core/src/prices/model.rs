//! Per-pair outcomes and batch aggregation.

use ltp_market_data::{CurrencyPair, MarketDataError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Where a served price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceSource {
    Cache,
    Upstream,
}

/// A successfully resolved pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairPrice {
    pub pair: CurrencyPair,
    pub amount: Decimal,
    pub source: PriceSource,
}

/// Result of resolving one pair. Exactly one of success or failure.
#[derive(Debug)]
pub enum FetchOutcome {
    Success(PairPrice),
    Failure {
        pair: CurrencyPair,
        reason: MarketDataError,
    },
}

impl FetchOutcome {
    pub fn pair(&self) -> &CurrencyPair {
        match self {
            FetchOutcome::Success(price) => &price.pair,
            FetchOutcome::Failure { pair, .. } => pair,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }
}

/// Overall classification of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    FullSuccess,
    PartialSuccess,
    AllFailed,
}

impl BatchStatus {
    /// HTTP-equivalent status: a batch with no successes is a service failure.
    pub fn http_status(&self) -> u16 {
        match self {
            BatchStatus::AllFailed => 503,
            BatchStatus::FullSuccess | BatchStatus::PartialSuccess => 200,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::FullSuccess => "FULL_SUCCESS",
            BatchStatus::PartialSuccess => "PARTIAL_SUCCESS",
            BatchStatus::AllFailed => "ALL_FAILED",
        }
    }
}

/// Aggregate of one batch request.
///
/// `error_count + successes.len() == total_attempts` always holds, and
/// `total_attempts <= resolved_count` with equality unless `cancelled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    /// Successful pairs in resolved-currency order.
    pub successes: Vec<PairPrice>,
    pub error_count: usize,
    pub total_attempts: usize,
    /// Message of the last failure in iteration order. Earlier ones are not kept.
    pub last_error_message: Option<String>,
    /// Number of currencies the request resolved to.
    pub resolved_count: usize,
    /// Set when the batch stopped before attempting every resolved currency.
    pub cancelled: bool,
}

impl BatchResult {
    /// Fold outcomes, in order, into a result for a batch of `resolved_count`.
    pub fn from_outcomes(
        outcomes: impl IntoIterator<Item = FetchOutcome>,
        resolved_count: usize,
    ) -> Self {
        let mut successes = Vec::new();
        let mut error_count = 0;
        let mut last_error_message = None;

        for outcome in outcomes {
            match outcome {
                FetchOutcome::Success(price) => successes.push(price),
                FetchOutcome::Failure { pair, reason } => {
                    error_count += 1;
                    last_error_message = Some(format!("{}: {}", pair, reason));
                }
            }
        }

        let total_attempts = successes.len() + error_count;
        Self {
            successes,
            error_count,
            total_attempts,
            last_error_message,
            resolved_count,
            cancelled: total_attempts < resolved_count,
        }
    }

    pub fn status(&self) -> BatchStatus {
        if self.successes.is_empty() {
            BatchStatus::AllFailed
        } else if self.error_count > 0 {
            BatchStatus::PartialSuccess
        } else {
            BatchStatus::FullSuccess
        }
    }

    /// Successes served from the cache.
    pub fn cache_hits(&self) -> usize {
        self.successes
            .iter()
            .filter(|p| p.source == PriceSource::Cache)
            .count()
    }

    /// Calls made to the upstream source. Every failure is an upstream call,
    /// since cache reads never fail a pair.
    pub fn upstream_calls(&self) -> usize {
        self.successes
            .iter()
            .filter(|p| p.source == PriceSource::Upstream)
            .count()
            + self.error_count
    }
}
