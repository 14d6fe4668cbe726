//! Counters recorded by the price coordinator.
//!
//! Recording goes through the `metrics` facade. Without an installed recorder
//! every call is a no-op; the server binary installs a Prometheus exporter.

use metrics::describe_counter;

pub const CACHE_HITS_TOTAL: &str = "ltp_cache_hits_total";
pub const CACHE_MISSES_TOTAL: &str = "ltp_cache_misses_total";
pub const UPSTREAM_CALLS_TOTAL: &str = "ltp_upstream_calls_total";
/// Labelled with the error `kind`.
pub const UPSTREAM_ERRORS_TOTAL: &str = "ltp_upstream_errors_total";

/// Register help text for the core counters with the installed recorder.
pub fn describe() {
    describe_counter!(CACHE_HITS_TOTAL, "Pair lookups served by a fresh cache entry");
    describe_counter!(
        CACHE_MISSES_TOTAL,
        "Pair lookups with no fresh cache entry"
    );
    describe_counter!(UPSTREAM_CALLS_TOTAL, "Requests sent to the quote provider");
    describe_counter!(
        UPSTREAM_ERRORS_TOTAL,
        "Quote provider requests that failed, by error kind"
    );
}
