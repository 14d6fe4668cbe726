//! Error types for the market data crate.
//!
//! [`MarketDataError`] classifies every way a single pair fetch can fail. All
//! variants are terminal for that fetch.

use thiserror::Error;

/// Errors that can occur while fetching a price from the upstream provider.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The request could not be completed (connection refused, DNS, timeout...).
    #[error("Transport error: {provider} - {message}")]
    Transport {
        /// The provider that could not be reached
        provider: String,
        /// The underlying transport failure
        message: String,
    },

    /// The response body did not match the expected schema.
    #[error("Protocol error: {provider} - {message}")]
    Protocol {
        /// The provider that returned the malformed payload
        provider: String,
        /// Description of the parse failure
        message: String,
    },

    /// The provider's own payload reports an error condition (e.g. unknown pair).
    #[error("Upstream rejected request: {provider} - {}", .errors.join(", "))]
    UpstreamRejected {
        /// The provider that rejected the request
        provider: String,
        /// Error strings reported by the provider
        errors: Vec<String>,
    },

    /// The provider returned a well-formed but empty result set.
    #[error("No price data found for {pair}")]
    NoData {
        /// The pair that had no data
        pair: String,
    },
}

impl MarketDataError {
    /// Stable label for structured logs.
    ///
    /// ```
    /// use ltp_market_data::MarketDataError;
    ///
    /// let error = MarketDataError::NoData { pair: "BTC/USD".to_string() };
    /// assert_eq!(error.kind(), "no_data");
    /// ```
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Protocol { .. } => "protocol",
            Self::UpstreamRejected { .. } => "upstream_rejected",
            Self::NoData { .. } => "no_data",
        }
    }

    /// Classify a `reqwest` failure. Body decoding failures are protocol
    /// errors; everything else (connect, timeout, redirect) is transport.
    pub fn from_reqwest(provider: &str, err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Protocol {
                provider: provider.to_string(),
                message: err.to_string(),
            }
        } else {
            Self::Transport {
                provider: provider.to_string(),
                message: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        let transport = MarketDataError::Transport {
            provider: "KRAKEN".to_string(),
            message: "connection refused".to_string(),
        };
        assert_eq!(transport.kind(), "transport");

        let protocol = MarketDataError::Protocol {
            provider: "KRAKEN".to_string(),
            message: "expected value".to_string(),
        };
        assert_eq!(protocol.kind(), "protocol");

        let rejected = MarketDataError::UpstreamRejected {
            provider: "KRAKEN".to_string(),
            errors: vec!["EQuery:Unknown asset pair".to_string()],
        };
        assert_eq!(rejected.kind(), "upstream_rejected");
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::UpstreamRejected {
            provider: "KRAKEN".to_string(),
            errors: vec![
                "EQuery:Unknown asset pair".to_string(),
                "EGeneral:Invalid arguments".to_string(),
            ],
        };
        assert_eq!(
            format!("{}", error),
            "Upstream rejected request: KRAKEN - EQuery:Unknown asset pair, EGeneral:Invalid arguments"
        );

        let error = MarketDataError::NoData {
            pair: "BTC/CHF".to_string(),
        };
        assert_eq!(format!("{}", error), "No price data found for BTC/CHF");
    }
}
