//! LTP Market Data Crate
//!
//! This crate fetches the last traded price of the tracked asset from an
//! external quote provider.
//!
//! # Overview
//!
//! - [`CurrencyPair`] - the tracked base asset against a quote currency
//! - [`QuoteSource`] - provider seam: one pair in, one price (or a classified error) out
//! - [`KrakenProvider`] - the Kraken public ticker adapter
//! - [`MarketDataError`] - transport, protocol, upstream-rejected and no-data failures
//!
//! # Flow
//!
//! ```text
//! currency code ──> CurrencyPair ──> provider symbol (e.g. XBTUSD)
//!                                          |
//!                                          v
//!                                   QuoteSource::get_latest_price
//!                                          |
//!                                          v
//!                                  Decimal | MarketDataError
//! ```
//!
//! No retries happen inside this crate. Every error is terminal for the pair
//! fetch that produced it; retry policy belongs to the caller.

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::MarketDataError;
pub use models::{CurrencyPair, BASE_ASSET};
pub use provider::kraken::KrakenProvider;
pub use provider::QuoteSource;
