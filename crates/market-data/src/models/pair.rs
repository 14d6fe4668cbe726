use std::fmt;

use serde::{Deserialize, Serialize};

/// The tracked base asset. Every pair quoted by this service is `BTC/<QUOTE>`.
pub const BASE_ASSET: &str = "BTC";

/// Prefix of every cache key.
const CACHE_KEY_PREFIX: &str = "price:";

/// A base asset quoted in a currency, e.g. `BTC/USD`.
///
/// Identity is the quote currency within the fixed base; the quote code is
/// kept verbatim as supplied by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub base: String,
    pub quote: String,
}

impl CurrencyPair {
    /// Pair the tracked base asset with `quote`.
    pub fn new(quote: impl Into<String>) -> Self {
        Self {
            base: BASE_ASSET.to_string(),
            quote: quote.into(),
        }
    }

    /// Key used in the shared cache: `price:<BASE>/<QUOTE>`.
    pub fn cache_key(&self) -> String {
        format!("{}{}", CACHE_KEY_PREFIX, self)
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}
