//! Quote provider abstractions and implementations.
//!
//! This module contains:
//! - The `QuoteSource` trait that every provider implements
//! - The Kraken public ticker adapter
//!
//! Providers receive a [`CurrencyPair`](crate::CurrencyPair) and translate it
//! into their own symbol scheme; callers never see provider symbols.

mod traits;

pub mod kraken;

pub use traits::QuoteSource;
