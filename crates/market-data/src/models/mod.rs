//! Market data models
//!
//! - `pair` - the tracked asset paired with a quote currency (CurrencyPair)

mod pair;

pub use pair::{CurrencyPair, BASE_ASSET};
