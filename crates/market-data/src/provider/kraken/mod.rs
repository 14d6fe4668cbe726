//! Kraken provider for last traded prices.
//!
//! Uses the public `Ticker` endpoint, which needs no API key. Kraken names
//! bitcoin `XBT`, so `BTC/USD` is requested as `XBTUSD`.
//!
//! API documentation: https://docs.kraken.com/api/docs/rest-api/get-ticker-information

mod models;

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::{CurrencyPair, BASE_ASSET};
use crate::provider::QuoteSource;

use models::KrakenTickerResponse;

/// Provider ID constant
const PROVIDER_ID: &str = "KRAKEN";

/// Public REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.kraken.com";

/// Default HTTP request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Kraken's code for bitcoin
const KRAKEN_BTC: &str = "XBT";

/// Kraken public ticker provider.
///
/// # Example
///
/// ```ignore
/// use ltp_market_data::KrakenProvider;
///
/// let provider = KrakenProvider::new("https://api.kraken.com", Duration::from_secs(10));
/// ```
pub struct KrakenProvider {
    client: Client,
    base_url: String,
}

impl KrakenProvider {
    /// Create a provider talking to `base_url` with a per-request `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Kraken pair symbol for `pair`, e.g. `XBTUSD`.
    fn provider_symbol(pair: &CurrencyPair) -> String {
        let base = if pair.base == BASE_ASSET {
            KRAKEN_BTC
        } else {
            pair.base.as_str()
        };
        format!("{}{}", base, pair.quote)
    }

    fn ticker_url(&self, pair: &CurrencyPair) -> String {
        format!(
            "{}/0/public/Ticker?pair={}",
            self.base_url,
            urlencoding::encode(&Self::provider_symbol(pair))
        )
    }

    /// Extract the last traded price from a ticker response body.
    fn parse_ticker(pair: &CurrencyPair, body: &[u8]) -> Result<Decimal, MarketDataError> {
        let response: KrakenTickerResponse =
            serde_json::from_slice(body).map_err(|e| MarketDataError::Protocol {
                provider: PROVIDER_ID.to_string(),
                message: format!("failed to parse response: {}", e),
            })?;

        if !response.error.is_empty() {
            return Err(MarketDataError::UpstreamRejected {
                provider: PROVIDER_ID.to_string(),
                errors: response.error,
            });
        }

        let last_trade = response
            .result
            .values()
            .find_map(|ticker| ticker.c.first())
            .ok_or_else(|| MarketDataError::NoData {
                pair: pair.to_string(),
            })?;

        let price = Decimal::from_str(last_trade).map_err(|e| MarketDataError::Protocol {
            provider: PROVIDER_ID.to_string(),
            message: format!("failed to parse price '{}': {}", last_trade, e),
        })?;

        if price <= Decimal::ZERO {
            return Err(MarketDataError::Protocol {
                provider: PROVIDER_ID.to_string(),
                message: format!("non-positive price '{}'", last_trade),
            });
        }

        Ok(price)
    }
}

impl Default for KrakenProvider {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl QuoteSource for KrakenProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_latest_price(&self, pair: &CurrencyPair) -> Result<Decimal, MarketDataError> {
        let url = self.ticker_url(pair);
        debug!("Fetching Kraken ticker for {} from {}", pair, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MarketDataError::from_reqwest(PROVIDER_ID, e))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| MarketDataError::from_reqwest(PROVIDER_ID, e))?;

        Self::parse_ticker(pair, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd() -> CurrencyPair {
        CurrencyPair::new("USD")
    }

    #[test]
    fn test_provider_id() {
        let provider = KrakenProvider::default();
        assert_eq!(provider.id(), "KRAKEN");
    }

    #[test]
    fn test_provider_symbol_uses_xbt() {
        assert_eq!(KrakenProvider::provider_symbol(&usd()), "XBTUSD");
        assert_eq!(
            KrakenProvider::provider_symbol(&CurrencyPair::new("CHF")),
            "XBTCHF"
        );
    }

    #[test]
    fn test_ticker_url_trims_trailing_slash() {
        let provider = KrakenProvider::new("http://127.0.0.1:9999/", DEFAULT_TIMEOUT);
        assert_eq!(
            provider.ticker_url(&usd()),
            "http://127.0.0.1:9999/0/public/Ticker?pair=XBTUSD"
        );
    }

    #[test]
    fn test_parse_last_trade_price() {
        let body = br#"{
            "error": [],
            "result": {
                "XXBTZUSD": {
                    "a": ["52001.00000", "1", "1.000"],
                    "c": ["52000.10000", "0.00100000"]
                }
            }
        }"#;
        let price = KrakenProvider::parse_ticker(&usd(), body).unwrap();
        assert_eq!(price, dec!(52000.1));
    }

    #[test]
    fn test_parse_upstream_error_list() {
        let body = br#"{"error":["EQuery:Unknown asset pair"]}"#;
        let err = KrakenProvider::parse_ticker(&CurrencyPair::new("INVALID"), body).unwrap_err();
        match err {
            MarketDataError::UpstreamRejected { provider, errors } => {
                assert_eq!(provider, "KRAKEN");
                assert_eq!(errors, vec!["EQuery:Unknown asset pair".to_string()]);
            }
            other => panic!("Expected UpstreamRejected, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_result_is_no_data() {
        let body = br#"{"error":[],"result":{}}"#;
        let err = KrakenProvider::parse_ticker(&usd(), body).unwrap_err();
        assert!(matches!(err, MarketDataError::NoData { ref pair } if pair == "BTC/USD"));
    }

    #[test]
    fn test_parse_entry_without_trades_is_no_data() {
        let body = br#"{"error":[],"result":{"XXBTZUSD":{"c":[]}}}"#;
        let err = KrakenProvider::parse_ticker(&usd(), body).unwrap_err();
        assert_eq!(err.kind(), "no_data");
    }

    #[test]
    fn test_parse_malformed_body_is_protocol_error() {
        let err = KrakenProvider::parse_ticker(&usd(), b"<html>502 Bad Gateway</html>").unwrap_err();
        assert_eq!(err.kind(), "protocol");
    }

    #[test]
    fn test_parse_bad_price_string_is_protocol_error() {
        let body = br#"{"error":[],"result":{"XXBTZUSD":{"c":["abc","1"]}}}"#;
        let err = KrakenProvider::parse_ticker(&usd(), body).unwrap_err();
        assert_eq!(err.kind(), "protocol");
    }

    #[test]
    fn test_parse_non_positive_price_is_protocol_error() {
        let body = br#"{"error":[],"result":{"XXBTZUSD":{"c":["0.00000","1"]}}}"#;
        let err = KrakenProvider::parse_ticker(&usd(), body).unwrap_err();
        assert_eq!(err.kind(), "protocol");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = KrakenProvider::new(format!("http://{}", addr), Duration::from_millis(500));
        let err = provider.get_latest_price(&usd()).await.unwrap_err();
        assert_eq!(err.kind(), "transport");
    }
}
