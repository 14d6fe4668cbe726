//! Kraken public API response models.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Envelope returned by `/0/public/Ticker`.
///
/// Kraken always reports failures through `error`; `result` is absent when
/// the request was rejected.
#[derive(Debug, Deserialize)]
pub struct KrakenTickerResponse {
    #[serde(default)]
    pub error: Vec<String>,
    #[serde(default)]
    pub result: BTreeMap<String, KrakenTicker>,
}

/// Ticker entry keyed by Kraken's own pair name (e.g. `XXBTZUSD`).
#[derive(Debug, Deserialize)]
pub struct KrakenTicker {
    /// Last trade closed: `[price, lot volume]`
    #[serde(default)]
    pub c: Vec<String>,
    // Note: a, b, v, p, t, l, h, o exist but only the last trade is used
}
