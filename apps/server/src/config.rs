use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use ltp_core::audit::DEFAULT_AUDIT_QUEUE_CAPACITY;
use ltp_core::cache::DEFAULT_FRESHNESS_WINDOW_SECS;

/// Upper bound for `LTP_CACHE_TTL_SECS` (one week).
pub const MAX_CACHE_TTL_SECS: u64 = 7 * 24 * 60 * 60;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// `None` runs with the in-process cache.
    pub redis_url: Option<String>,
    pub cache_ttl_secs: i64,
    pub cache_op_timeout: Duration,
    pub kraken_base_url: String,
    pub upstream_timeout: Duration,
    /// `None` disables audit persistence.
    pub db_path: Option<String>,
    pub audit_queue_capacity: usize,
    /// How long shutdown waits for queued audit records to be written.
    pub audit_drain_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Unset and unparsable numeric
    /// values fall back to their defaults.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());
        let number = |key: &str, default: u64| -> u64 {
            get(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };
        let optional = |key: &str, default: &str| -> Option<String> {
            let value = var(key, default);
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };

        let listen_addr: SocketAddr = var("LTP_LISTEN_ADDR", "0.0.0.0:8080")
            .parse()
            .context("Invalid LTP_LISTEN_ADDR")?;
        let cache_ttl_secs = number("LTP_CACHE_TTL_SECS", DEFAULT_FRESHNESS_WINDOW_SECS as u64);
        if cache_ttl_secs > MAX_CACHE_TTL_SECS {
            anyhow::bail!(
                "LTP_CACHE_TTL_SECS must be at most {} (got {})",
                MAX_CACHE_TTL_SECS,
                cache_ttl_secs
            );
        }
        let cors_allow = var("LTP_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            listen_addr,
            cors_allow,
            request_timeout: Duration::from_millis(number("LTP_REQUEST_TIMEOUT_MS", 30_000)),
            redis_url: optional("LTP_REDIS_URL", "redis://localhost:6379"),
            cache_ttl_secs: cache_ttl_secs.max(1) as i64,
            cache_op_timeout: Duration::from_millis(number("LTP_CACHE_OP_TIMEOUT_MS", 250)),
            kraken_base_url: var("LTP_KRAKEN_BASE_URL", "https://api.kraken.com"),
            upstream_timeout: Duration::from_millis(number("LTP_UPSTREAM_TIMEOUT_MS", 10_000)),
            db_path: optional("LTP_DB_PATH", "./db/ltp.db"),
            audit_queue_capacity: number(
                "LTP_AUDIT_QUEUE_CAPACITY",
                DEFAULT_AUDIT_QUEUE_CAPACITY as u64,
            ) as usize,
            audit_drain_timeout: Duration::from_millis(number("LTP_AUDIT_DRAIN_TIMEOUT_MS", 5_000)),
        })
    }
}
