//! Quote source trait definition.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::CurrencyPair;

/// Trait for upstream quote providers.
///
/// Implement this trait to plug in a new price source. A call performs exactly
/// one upstream request and never retries.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use ltp_market_data::{CurrencyPair, MarketDataError, QuoteSource};
/// use rust_decimal::Decimal;
///
/// struct FixedSource;
///
/// #[async_trait]
/// impl QuoteSource for FixedSource {
///     fn id(&self) -> &'static str {
///         "FIXED"
///     }
///
///     async fn get_latest_price(&self, _pair: &CurrencyPair) -> Result<Decimal, MarketDataError> {
///         Ok(Decimal::ONE)
///     }
/// }
/// ```
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Unique identifier for this provider, e.g. "KRAKEN".
    ///
    /// Used in error messages and logs.
    fn id(&self) -> &'static str;

    /// Fetch the last traded price for `pair`.
    ///
    /// # Returns
    ///
    /// A strictly positive price on success, or a classified `MarketDataError`.
    async fn get_latest_price(&self, pair: &CurrencyPair) -> Result<Decimal, MarketDataError>;
}
