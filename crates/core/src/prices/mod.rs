//! Batch price lookups.
//!
//! - [`model`] - per-pair outcomes, the aggregated batch result and its status
//! - [`resolver`] - turns a raw `pairs` parameter into an ordered currency list
//! - [`service`] - the cache-then-upstream coordinator
//!
//! ```text
//! "BTC/USD, BTC/EUR" ──> resolve_currencies ──> [USD, EUR]
//!                                                  │
//!                         PriceService::get_prices │ one pair at a time, in order
//!                                                  v
//!                         [FetchOutcome; N] ──> BatchResult ──> BatchStatus
//! ```

pub mod model;
pub mod resolver;
pub mod service;


pub use model::{BatchResult, BatchStatus, FetchOutcome, PairPrice, PriceSource};
pub use resolver::{resolve_currencies, DEFAULT_CURRENCIES};
pub use service::{PriceService, PriceServiceTrait};
