use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::notifier::{LogNotifier, SendGridNotifier};
use assessapp_core::{
    alerts::{AlertDeliveryService, NotificationTransport},
    fx::{FxService, RateCache, RateCacheConfig},
    history::HistoryRecorder,
    metrics::{MetricsConfig, MetricsEngine},
    portfolio::{PortfolioService, PortfolioServiceTrait},
    refresh::{RefreshConfig, RefreshService},
    scheduler::{ScheduleConfig, Scheduler},
    settings::SettingsService,
    sourcing::{AnalysisSource, DataSourcingPipeline, MarketDataSource, PositionSource},
};
use assessapp_market_data::{
    AlphaVantageProvider, ExchangeRatesApiProvider, RetryPolicy, XaiProvider,
};
use assessapp_storage_sqlite::{
    db, AlertRepository, FxRepository, HistoryRepository, PositionRepository, SettingsRepository,
};

/// Everything the process needs, built once at startup and dropped at shutdown.
pub struct AppContext {
    pub scheduler: Arc<Scheduler>,
    pub portfolio_service: Arc<dyn PortfolioServiceTrait>,
    pub source_ids: Vec<&'static str>,
    pub transport_name: &'static str,
}

pub fn init_tracing() {
    let log_format =
        std::env::var("ASSESSAPP_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
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

fn build_sources(config: &Config, metrics_config: &MetricsConfig) -> Vec<Arc<dyn PositionSource>> {
    let mut sources: Vec<Arc<dyn PositionSource>> = Vec::new();

    if let Some(key) = &config.alpha_vantage_api_key {
        let provider = AlphaVantageProvider::new(key.clone(), config.quant_timeout);
        sources.push(Arc::new(MarketDataSource::new(
            Arc::new(provider),
            RetryPolicy::default(),
        )));
    }

    if let Some(key) = &config.xai_api_key {
        let mut provider = XaiProvider::new(key.clone(), config.analysis_timeout)
            .with_model(config.xai_model.clone());
        if let Some(url) = &config.xai_base_url {
            provider = provider.with_base_url(url.clone());
        }
        sources.push(Arc::new(AnalysisSource::new(
            Arc::new(provider),
            RetryPolicy::default(),
            metrics_config.strategy_rules(),
            &config.base_currency,
        )));
    }

    sources
}

pub async fn build_context(config: &Config) -> anyhow::Result<Arc<AppContext>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);
    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone())?;

    let position_repository = Arc::new(PositionRepository::new(pool.clone(), writer.clone()));
    let history_repository = Arc::new(HistoryRepository::new(pool.clone(), writer.clone()));
    let alert_repository = Arc::new(AlertRepository::new(pool.clone(), writer.clone()));
    let settings_repository = Arc::new(SettingsRepository::new(pool.clone(), writer.clone()));
    let fx_repository = Arc::new(FxRepository::new(pool.clone(), writer.clone()));

    let settings_service = Arc::new(SettingsService::new(settings_repository));

    let rate_cache = Arc::new(RateCache::new(RateCacheConfig {
        ttl: config.fx_cache_ttl,
    }));
    let mut fx_service = FxService::new(fx_repository, rate_cache.clone(), &config.base_currency);
    if let Some(key) = &config.exchange_rates_api_key {
        fx_service = fx_service.with_provider(Arc::new(ExchangeRatesApiProvider::new(
            key.clone(),
            config.quant_timeout,
        )));
    } else {
        tracing::warn!("No FX provider configured; only stored or manual rates will be used");
    }
    let fx_service = Arc::new(fx_service);

    let metrics_config = MetricsConfig {
        sell_threshold: config.sell_threshold,
        target_ev: config.target_ev,
        ..MetricsConfig::default()
    };
    metrics_config.validate()?;
    let engine = Arc::new(MetricsEngine::new(metrics_config.clone()));

    let sources = build_sources(config, &metrics_config);
    if sources.is_empty() {
        tracing::warn!("No data providers configured; refreshes will fall back to Unavailable");
    }
    let pipeline = Arc::new(DataSourcingPipeline::new(
        sources,
        rate_cache,
        &config.base_currency,
    ));
    let source_ids = pipeline.source_ids();

    let history = Arc::new(HistoryRecorder::new(
        history_repository,
        config.history_retention,
    ));

    let refresh_service = Arc::new(RefreshService::new(
        position_repository.clone(),
        pipeline,
        engine,
        fx_service.clone(),
        history,
        alert_repository.clone(),
        settings_service.clone(),
        RefreshConfig {
            unavailable_policy: config.refresh_failure_policy,
            pacing: config.batch_pacing,
        },
    ));

    let transport: Arc<dyn NotificationTransport> = match config.email() {
        Some((key, from, to)) => Arc::new(SendGridNotifier::new(
            key,
            from,
            to,
            config.quant_timeout,
        )),
        None => {
            tracing::info!("E-mail alerts not configured; alerts will be logged");
            Arc::new(LogNotifier)
        }
    };
    let transport_name = transport.name();
    let delivery_service = Arc::new(AlertDeliveryService::new(
        alert_repository,
        transport,
        settings_service,
    ));

    let scheduler = Arc::new(Scheduler::new(
        refresh_service,
        delivery_service,
        &ScheduleConfig::default(),
    )?);

    let portfolio_service = Arc::new(PortfolioService::new(position_repository, fx_service));

    Ok(Arc::new(AppContext {
        scheduler,
        portfolio_service,
        source_ids,
        transport_name,
    }))
}
