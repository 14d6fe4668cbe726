use std::sync::Arc;

use crate::config::Config;
use crate::metrics::init_metrics;
use ltp_core::{
    audit::{AuditQueue, AuditSink, AuditWorker, LogAuditSink},
    cache::{CacheBackend, MemoryBackend, PriceCache, RedisBackend},
    prices::{PriceService, PriceServiceTrait},
    time::SystemClock,
};
use ltp_market_data::KrakenProvider;
use ltp_storage_sqlite::{create_pool, init, run_migrations, SqliteAuditSink};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub price_service: Arc<dyn PriceServiceTrait>,
    pub audit_queue: AuditQueue,
    pub audit_sink: Arc<dyn AuditSink>,
    /// `None` when no recorder is installed; `/metrics` then answers 404.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Wire a state from already-built parts and start the audit worker.
    ///
    /// The worker drains once the returned state (and every router holding
    /// it) is dropped. Must be called inside a Tokio runtime.
    pub fn new(
        price_service: Arc<dyn PriceServiceTrait>,
        audit_sink: Arc<dyn AuditSink>,
        audit_queue_capacity: usize,
        metrics: Option<PrometheusHandle>,
    ) -> (Arc<Self>, AuditWorker) {
        let (audit_queue, worker) = AuditQueue::spawn(audit_sink.clone(), audit_queue_capacity);
        let state = Arc::new(Self {
            price_service,
            audit_queue,
            audit_sink,
            metrics,
        });
        (state, worker)
    }
}

pub fn init_tracing() {
    let log_format = std::env::var("LTP_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

fn build_cache_backend(config: &Config) -> Option<Arc<dyn CacheBackend>> {
    match config.redis_url.as_deref() {
        Some(url) => match RedisBackend::open(url, config.cache_op_timeout) {
            Ok(backend) => {
                tracing::info!("Price cache backed by Redis");
                Some(Arc::new(backend))
            }
            Err(e) => {
                tracing::warn!("Invalid LTP_REDIS_URL ({}), running without a price cache", e);
                None
            }
        },
        None => {
            tracing::info!("LTP_REDIS_URL is empty, using the in-process price cache");
            Some(Arc::new(MemoryBackend::new()))
        }
    }
}

fn build_audit_sink(config: &Config) -> Arc<dyn AuditSink> {
    let Some(path) = config.db_path.as_deref() else {
        tracing::info!("LTP_DB_PATH is empty, audit records go to the log only");
        return Arc::new(LogAuditSink);
    };

    let opened = init(path).and_then(|db_path| {
        let pool = create_pool(&db_path)?;
        run_migrations(&pool)?;
        Ok((db_path, pool))
    });

    match opened {
        Ok((db_path, pool)) => {
            tracing::info!("Database path in use: {}", db_path);
            Arc::new(SqliteAuditSink::new(pool))
        }
        Err(e) => {
            tracing::warn!("Database initialization failed: {}", e);
            tracing::info!("Continuing without request persistence");
            Arc::new(LogAuditSink)
        }
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<(Arc<AppState>, AuditWorker)> {
    let cache = PriceCache::new(
        build_cache_backend(config),
        Arc::new(SystemClock),
        chrono::Duration::seconds(config.cache_ttl_secs),
    );
    let source = Arc::new(KrakenProvider::new(
        config.kraken_base_url.as_str(),
        config.upstream_timeout,
    ));
    let price_service: Arc<dyn PriceServiceTrait> =
        Arc::new(PriceService::new(cache, source));

    let audit_sink = build_audit_sink(config);

    Ok(AppState::new(
        price_service,
        audit_sink,
        config.audit_queue_capacity,
        init_metrics(),
    ))
}
