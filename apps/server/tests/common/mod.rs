#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::Response;
use ltp_core::audit::{AuditSink, AuditWorker, MockAuditSink};
use ltp_core::cache::{CacheBackend, MemoryBackend, PriceCache};
use ltp_core::prices::PriceService;
use ltp_core::time::SystemClock;
use ltp_market_data::{CurrencyPair, MarketDataError, QuoteSource};
use ltp_server::{api::app_router, config::Config, AppState};
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;

/// Prices the configured quote currencies and rejects every other one.
pub struct FakeSource {
    prices: HashMap<String, Decimal>,
    delay: Duration,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeSource {
    pub fn new(prices: &[(&str, Decimal)]) -> Self {
        Self {
            prices: prices
                .iter()
                .map(|(quote, price)| (quote.to_string(), *price))
                .collect(),
            delay: Duration::ZERO,
            calls: Arc::default(),
        }
    }

    /// Sleep this long inside every fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Shared log of the quote currencies fetched so far.
    pub fn call_log(&self) -> Arc<Mutex<Vec<String>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl QuoteSource for FakeSource {
    fn id(&self) -> &'static str {
        "FAKE"
    }

    async fn get_latest_price(&self, pair: &CurrencyPair) -> Result<Decimal, MarketDataError> {
        self.calls.lock().unwrap().push(pair.quote.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.prices
            .get(&pair.quote)
            .copied()
            .ok_or_else(|| MarketDataError::UpstreamRejected {
                provider: "FAKE".to_string(),
                errors: vec!["EQuery:Unknown asset pair".to_string()],
            })
    }
}

pub fn test_config() -> Config {
    Config::from_lookup(|_| None).unwrap()
}

pub struct TestApp {
    pub router: axum::Router,
    pub audit: MockAuditSink,
    pub worker: AuditWorker,
}

pub fn build_app(
    source: FakeSource,
    backend: Option<Arc<dyn CacheBackend>>,
    sink: Arc<dyn AuditSink>,
    audit: MockAuditSink,
) -> TestApp {
    build_app_with_config(source, backend, sink, audit, &test_config(), None)
}

pub fn build_app_with_config(
    source: FakeSource,
    backend: Option<Arc<dyn CacheBackend>>,
    sink: Arc<dyn AuditSink>,
    audit: MockAuditSink,
    config: &Config,
    metrics: Option<PrometheusHandle>,
) -> TestApp {
    let cache = PriceCache::new(backend, Arc::new(SystemClock), chrono::Duration::seconds(60));
    let service = Arc::new(PriceService::new(cache, Arc::new(source)));
    let (state, worker) = AppState::new(service, sink, 16, metrics);
    TestApp {
        router: app_router(state, config),
        audit,
        worker,
    }
}

/// App with an in-memory cache that records audit entries in a mock sink.
pub fn app_with(source: FakeSource) -> TestApp {
    app_with_config(source, &test_config()).0
}

/// Like [`app_with`], handing back the cache so tests can inspect it.
pub fn app_with_config(source: FakeSource, config: &Config) -> (TestApp, Arc<MemoryBackend>) {
    let audit = MockAuditSink::new();
    let memory = Arc::new(MemoryBackend::new());
    let backend = memory.clone() as Arc<dyn CacheBackend>;
    let app = build_app_with_config(
        source,
        Some(backend),
        Arc::new(audit.clone()),
        audit,
        config,
        None,
    );
    (app, memory)
}

/// App whose `/metrics` route renders `handle`.
pub fn app_with_metrics(source: FakeSource, handle: Option<PrometheusHandle>) -> TestApp {
    let audit = MockAuditSink::new();
    let backend: Arc<dyn CacheBackend> = Arc::new(MemoryBackend::new());
    build_app_with_config(
        source,
        Some(backend),
        Arc::new(audit.clone()),
        audit,
        &test_config(),
        handle,
    )
}

/// Config with overrides on top of the defaults.
pub fn config_with(vars: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// The audit worker runs in the background; poll until it has caught up.
pub async fn wait_for_records(audit: &MockAuditSink, expected: usize) {
    for _ in 0..100 {
        if audit.len() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {} audit records, got {}", expected, audit.len());
}
