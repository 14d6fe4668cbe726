//! Pair-list resolution.

/// Currencies priced when the request names none, in response order.
pub const DEFAULT_CURRENCIES: [&str; 3] = ["USD", "EUR", "CHF"];

/// Resolve a raw comma-separated `BASE/QUOTE` list into quote currency codes.
///
/// - absent or empty input yields [`DEFAULT_CURRENCIES`]
/// - tokens are trimmed and empty tokens skipped
/// - a token without `/`, or with nothing after the first `/`, is dropped
/// - order is preserved and duplicates are kept
///
/// The base part of a token is not checked; every pair is priced against the
/// tracked base asset. The quote code is returned verbatim.
///
/// ```
/// use ltp_core::prices::resolve_currencies;
///
/// assert_eq!(resolve_currencies(Some("BTC/USD, BTC/EUR")), vec!["USD", "EUR"]);
/// assert!(resolve_currencies(Some("INVALID")).is_empty());
/// ```
pub fn resolve_currencies(raw: Option<&str>) -> Vec<String> {
    let raw = match raw {
        None | Some("") => {
            return DEFAULT_CURRENCIES.iter().map(|c| c.to_string()).collect();
        }
        Some(raw) => raw,
    };

    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.split_once('/'))
        .map(|(_, quote)| quote)
        .filter(|quote| !quote.is_empty())
        .map(str::to_string)
        .collect()
}
