//! In-process cache backend.
//!
//! Used for local runs without Redis and by tests. Entries carry a physical
//! deadline measured on the monotonic clock.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::warn;

use super::backend::{CacheBackend, CacheError};

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Memory cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = self.lock_entries();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut entries = self.lock_entries();
        // Writes sweep expired entries so keys that are never read again
        // cannot accumulate.
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get("price:BTC/USD").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let backend = MemoryBackend::new();
        backend
            .set_ex("price:BTC/USD", "{}", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            backend.get("price:BTC/USD").await.unwrap(),
            Some("{}".to_string())
        );
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let backend = MemoryBackend::new();
        let ttl = Duration::from_secs(60);
        backend.set_ex("k", "first", ttl).await.unwrap();
        backend.set_ex("k", "second", ttl).await.unwrap();
        assert_eq!(backend.get("k").await.unwrap(), Some("second".to_string()));
    }

    #[tokio::test]
    async fn test_physical_expiry() {
        let backend = MemoryBackend::new();
        backend.set_ex("k", "v", Duration::ZERO).await.unwrap();
        assert_eq!(backend.get("k").await.unwrap(), None);
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_write_sweeps_unread_expired_keys() {
        let backend = MemoryBackend::new();
        backend.set_ex("price:BTC/EUR", "old", Duration::ZERO).await.unwrap();
        backend.set_ex("price:BTC/CHF", "old", Duration::ZERO).await.unwrap();

        backend
            .set_ex("price:BTC/USD", "fresh", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(backend.len(), 1);
        assert_eq!(
            backend.get("price:BTC/USD").await.unwrap(),
            Some("fresh".to_string())
        );
    }
}
