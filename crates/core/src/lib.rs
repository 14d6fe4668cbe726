//! Price acquisition and caching for the LTP service.
//!
//! This crate is HTTP- and database-agnostic. It contains:
//! - [`cache`] - logical freshness on top of an optional shared key-value store
//! - [`prices`] - pair resolution and the batch coordinator
//! - [`audit`] - audit records and the bounded fire-and-forget queue
//! - [`metrics`] - names of the counters recorded through the `metrics` facade
//! - [`time`] - clock abstraction so freshness can be tested deterministically
//!
//! ```text
//! raw pairs ──> resolve_currencies ──> for each currency:
//!                                         PriceCache::get ── fresh ──> Success
//!                                              │ miss/stale
//!                                              v
//!                                         QuoteSource ── ok ──> PriceCache::put ──> Success
//!                                              │ err
//!                                              v
//!                                           Failure
//!                                  ──> BatchResult (+ derived BatchStatus)
//! ```

pub mod audit;
pub mod cache;
pub mod errors;
pub mod metrics;
pub mod prices;
pub mod time;

pub use errors::{DatabaseError, Error, Result};
