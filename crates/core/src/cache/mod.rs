//! Price cache.
//!
//! - [`backend`] - the `CacheBackend` seam and its error type
//! - [`redis`] - shared Redis backend with bounded operations
//! - [`memory`] - in-process backend with physical expiry
//! - [`price_cache`] - logical freshness on top of an optional backend
//!
//! Two independent expiry layers apply to every entry: the backend evicts it
//! physically after the freshness window, and every read is checked against the
//! window again. Either one alone is enough to stop a stale price being served.

pub mod backend;
pub mod memory;
pub mod price_cache;
pub mod redis;

pub use backend::{CacheBackend, CacheError};
pub use memory::MemoryBackend;
pub use price_cache::{CachedQuote, PriceCache, DEFAULT_FRESHNESS_WINDOW_SECS};
pub use redis::RedisBackend;
