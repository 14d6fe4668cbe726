//! Redis cache backend.
//!
//! The connection is established lazily on first use and shared through a
//! `ConnectionManager`, which reconnects in the background after failures.
//! The first connect is attempted once, without retries. After it fails,
//! commands fail immediately until `CONNECT_COOLDOWN` has passed. Every
//! command also runs under `op_timeout`.

use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, warn};
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;
use tokio::sync::OnceCell;

use super::backend::{CacheBackend, CacheError};

/// Default per-command budget.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_millis(250);

/// How long a failed connect short-circuits later commands.
pub const CONNECT_COOLDOWN: Duration = Duration::from_secs(5);

pub struct RedisBackend {
    client: redis::Client,
    connection: OnceCell<ConnectionManager>,
    last_connect_failure: Mutex<Option<Instant>>,
    op_timeout: Duration,
    cooldown: Duration,
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Unavailable(err.to_string())
    }
}

impl RedisBackend {
    /// Build a backend for `url` (e.g. `redis://localhost:6379`).
    ///
    /// Only the URL is validated here; no network traffic happens until the
    /// first command.
    pub fn open(url: &str, op_timeout: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            connection: OnceCell::new(),
            last_connect_failure: Mutex::new(None),
            op_timeout,
            cooldown: CONNECT_COOLDOWN,
        })
    }

    /// Override the reconnect cooldown.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    fn lock_failure(&self) -> MutexGuard<'_, Option<Instant>> {
        self.last_connect_failure
            .lock()
            .unwrap_or_else(|p| p.into_inner())
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        if let Some(manager) = self.connection.get() {
            return Ok(manager.clone());
        }

        let last_failure = *self.lock_failure();
        if let Some(failed_at) = last_failure {
            if failed_at.elapsed() < self.cooldown {
                return Err(CacheError::Unavailable(
                    "Redis connect failed recently, skipping".to_string(),
                ));
            }
        }

        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(0)
            .set_connection_timeout(self.op_timeout);
        let result = self
            .connection
            .get_or_try_init(|| async {
                debug!("Connecting to Redis");
                ConnectionManager::new_with_config(self.client.clone(), config).await
            })
            .await;

        match result {
            Ok(manager) => {
                *self.lock_failure() = None;
                Ok(manager.clone())
            }
            Err(e) => {
                warn!("Redis connect failed, retrying in {:?}: {}", self.cooldown, e);
                *self.lock_failure() = Some(Instant::now());
                Err(e.into())
            }
        }
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, CacheError>
    where
        F: Future<Output = Result<T, CacheError>>,
    {
        tokio::time::timeout(self.op_timeout, fut)
            .await
            .map_err(|_| CacheError::Timeout {
                operation,
                after: self.op_timeout,
            })?
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.bounded("GET", async {
            let mut conn = self.connection().await?;
            let value: Option<String> = conn.get(key).await?;
            Ok(value)
        })
        .await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let seconds = ttl.as_secs().max(1);
        self.bounded("SET", async {
            let mut conn = self.connection().await?;
            let _: () = conn.set_ex(key, value, seconds).await?;
            Ok(())
        })
        .await
    }

    async fn ping(&self) -> Result<(), CacheError> {
        self.bounded("PING", async {
            let mut conn = self.connection().await?;
            let _: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_rejects_bad_url() {
        let result = RedisBackend::open("not a url", DEFAULT_OP_TIMEOUT);
        assert!(matches!(result, Err(CacheError::Unavailable(_))));
    }

    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("redis://{}", addr)
    }

    #[tokio::test]
    async fn test_refused_connection_fails_well_inside_budget() {
        let budget = Duration::from_secs(5);
        let backend = RedisBackend::open(&closed_port_url(), budget).unwrap();

        let started = Instant::now();
        for _ in 0..3 {
            let err = backend.get("price:BTC/USD").await.unwrap_err();
            assert!(matches!(err, CacheError::Unavailable(_)), "got {:?}", err);
        }
        assert!(backend
            .set_ex("price:BTC/USD", "{}", Duration::from_secs(60))
            .await
            .is_err());
        assert!(backend.ping().await.is_err());

        assert!(
            started.elapsed() < Duration::from_secs(1),
            "took {:?}",
            started.elapsed()
        );
    }

    #[tokio::test]
    async fn test_commands_skip_connect_during_cooldown() {
        let backend = RedisBackend::open(&closed_port_url(), Duration::from_secs(5)).unwrap();

        assert!(backend.get("k").await.is_err());
        assert!(backend.lock_failure().is_some());

        match backend.get("k").await {
            Err(CacheError::Unavailable(msg)) => assert!(msg.contains("recently")),
            other => panic!("expected short-circuit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connect_is_retried_after_cooldown() {
        let backend = RedisBackend::open(&closed_port_url(), Duration::from_secs(5))
            .unwrap()
            .with_cooldown(Duration::ZERO);

        assert!(backend.get("k").await.is_err());
        match backend.get("k").await {
            Err(CacheError::Unavailable(msg)) => assert!(!msg.contains("recently")),
            other => panic!("expected a fresh connect attempt, got {:?}", other),
        }
    }
}
