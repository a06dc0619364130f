use super::*;
use crate::alerts::{Alert, AlertKind, AlertRepositoryTrait, NewAlert};
use crate::errors::{DatabaseError, Error, Result};
use crate::fx::{ExchangeRate, FxServiceTrait, RateCache};
use crate::history::{HistoryRecorder, HistoryRepositoryTrait, HistorySnapshot};
use crate::metrics::MetricsEngine;
use crate::positions::{
    Assessment, DerivedMetrics, NewPosition, Position, PositionRepositoryTrait, UpdateFrequency,
};
use crate::settings::{PortfolioSettings, SettingsServiceTrait, SettingsUpdate};
use crate::sourcing::{DataSourcingPipeline, PositionSource, SourceKind, SourcedFields};
use assessapp_market_data::MarketDataError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// Mocks

#[derive(Default)]
struct MockPositionRepository {
    positions: Mutex<HashMap<String, Position>>,
}

impl MockPositionRepository {
    fn with(positions: Vec<Position>) -> Self {
        let repo = Self::default();
        for p in positions {
            repo.positions.lock().unwrap().insert(p.id.clone(), p);
        }
        repo
    }
}

#[async_trait]
impl PositionRepositoryTrait for MockPositionRepository {
    fn get_by_id(&self, position_id: &str) -> Result<Position> {
        self.positions
            .lock()
            .unwrap()
            .get(position_id)
            .cloned()
            .ok_or_else(|| Error::Database(DatabaseError::NotFound(position_id.to_string())))
    }

    fn list(&self, is_active_filter: Option<bool>) -> Result<Vec<Position>> {
        let mut positions: Vec<Position> = self
            .positions
            .lock()
            .unwrap()
            .values()
            .filter(|p| is_active_filter.map_or(true, |a| p.is_active == a))
            .cloned()
            .collect();
        positions.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(positions)
    }

    fn list_by_frequency(&self, frequency: UpdateFrequency) -> Result<Vec<Position>> {
        Ok(self
            .list(Some(true))?
            .into_iter()
            .filter(|p| p.update_frequency == frequency)
            .collect())
    }

    async fn create(&self, position: Position) -> Result<Position> {
        self.positions
            .lock()
            .unwrap()
            .insert(position.id.clone(), position.clone());
        Ok(position)
    }

    async fn update(&self, position: Position) -> Result<Position> {
        self.create(position).await
    }

    async fn update_weights(&self, weights: Vec<(String, f64)>) -> Result<usize> {
        Ok(weights.len())
    }

    async fn delete(&self, position_id: &str) -> Result<usize> {
        Ok(self
            .positions
            .lock()
            .unwrap()
            .remove(position_id)
            .map_or(0, |_| 1))
    }
}

#[derive(Default)]
struct MockHistoryRepository {
    rows: Mutex<Vec<HistorySnapshot>>,
    fail_appends: AtomicBool,
}

#[async_trait]
impl HistoryRepositoryTrait for MockHistoryRepository {
    async fn append(&self, snapshot: HistorySnapshot) -> Result<HistorySnapshot> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(Error::Database(DatabaseError::QueryFailed(
                "disk I/O error".to_string(),
            )));
        }
        self.rows.lock().unwrap().push(snapshot.clone());
        Ok(snapshot)
    }

    fn list_for_position(&self, position_id: &str, limit: i64) -> Result<Vec<HistorySnapshot>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|s| s.position_id == position_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn prune(&self, _position_id: &str, _keep: usize) -> Result<usize> {
        Ok(0)
    }
}

#[derive(Default)]
struct MockAlertRepository {
    alerts: Mutex<Vec<Alert>>,
}

#[async_trait]
impl AlertRepositoryTrait for MockAlertRepository {
    async fn create(&self, alert: NewAlert) -> Result<Alert> {
        let mut alerts = self.alerts.lock().unwrap();
        let created = Alert {
            id: format!("a{}", alerts.len() + 1),
            position_id: alert.position_id,
            ticker: alert.ticker,
            kind: alert.kind,
            message: alert.message,
            delivered: false,
            created_at: Utc::now(),
        };
        alerts.push(created.clone());
        Ok(created)
    }

    fn list_undelivered(&self) -> Result<Vec<Alert>> {
        Ok(self.alerts.lock().unwrap().clone())
    }

    async fn mark_delivered(&self, _alert_id: &str) -> Result<()> {
        Ok(())
    }

    fn list_recent(&self, _limit: i64) -> Result<Vec<Alert>> {
        Ok(self.alerts.lock().unwrap().clone())
    }
}

struct CacheBackedFx(Arc<RateCache>);

#[async_trait]
impl FxServiceTrait for CacheBackedFx {
    fn base_currency(&self) -> &str {
        "USD"
    }

    async fn rate_to_base(&self, currency: &str) -> f64 {
        if currency == "USD" {
            return 1.0;
        }
        self.0.get(currency).unwrap_or(1.0)
    }

    async fn rates_for(&self, _currencies: &[String]) -> HashMap<String, f64> {
        HashMap::new()
    }

    async fn set_manual_rate(&self, currency: &str, rate: f64) -> Result<ExchangeRate> {
        Ok(ExchangeRate::manual(currency, rate))
    }

    fn list_rates(&self) -> Result<Vec<ExchangeRate>> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
struct MockSettings {
    settings: Mutex<PortfolioSettings>,
}

#[async_trait]
impl SettingsServiceTrait for MockSettings {
    fn get_settings(&self) -> Result<PortfolioSettings> {
        Ok(self.settings.lock().unwrap().clone())
    }

    async fn update_settings(&self, _update: &SettingsUpdate) -> Result<PortfolioSettings> {
        self.get_settings()
    }

    async fn record_update_run(&self, at: DateTime<Utc>) -> Result<()> {
        self.settings.lock().unwrap().last_update_run = Some(at);
        Ok(())
    }
}

/// Answers from a fixed table keyed by ticker; unknown tickers fail.
struct ScriptedSource {
    kind: SourceKind,
    id: &'static str,
    answers: HashMap<String, SourcedFields>,
}

#[async_trait]
impl PositionSource for ScriptedSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn id(&self) -> &'static str {
        self.id
    }

    async fn fetch(&self, position: &Position) -> std::result::Result<SourcedFields, MarketDataError> {
        self.answers
            .get(&position.ticker)
            .cloned()
            .ok_or_else(|| MarketDataError::NoData {
                provider: self.id.to_string(),
                symbol: position.ticker.clone(),
            })
    }
}

// Fixtures

fn quote(price: f64, fair_value: f64) -> SourcedFields {
    SourcedFields {
        current_price: Some(price),
        fair_value: Some(fair_value),
        data_source: "ALPHA_VANTAGE".to_string(),
        quote_fetched_at: Some(Utc::now()),
        ..SourcedFields::default()
    }
}

fn position(id: &str, ticker: &str, frequency: UpdateFrequency) -> Position {
    let engine = MetricsEngine::default();
    let position = NewPosition {
        id: None,
        ticker: ticker.to_string(),
        isin: None,
        company_name: ticker.to_string(),
        sector: None,
        currency: "USD".to_string(),
        update_frequency: Some(frequency),
        current_price: 100.0,
        fair_value: 120.0,
        probability_positive: None,
        downside_risk: Some(-20.0),
        beta: 1.0,
        volatility: 0.0,
        shares_owned: 10.0,
        avg_price_local: 80.0,
        comment: None,
    }
    .into_position(id.to_string(), UpdateFrequency::Daily);
    engine.compute(&position)
}

struct Harness {
    positions: Arc<MockPositionRepository>,
    history: Arc<MockHistoryRepository>,
    alerts: Arc<MockAlertRepository>,
    settings: Arc<MockSettings>,
    cache: Arc<RateCache>,
    service: RefreshService,
}

fn harness(
    positions: Vec<Position>,
    answers: HashMap<String, SourcedFields>,
    policy: UnavailablePolicy,
) -> Harness {
    let positions = Arc::new(MockPositionRepository::with(positions));
    let history = Arc::new(MockHistoryRepository::default());
    let alerts = Arc::new(MockAlertRepository::default());
    let settings = Arc::new(MockSettings::default());
    let cache = Arc::new(RateCache::default());

    let source: Arc<dyn PositionSource> = Arc::new(ScriptedSource {
        kind: SourceKind::MarketData,
        id: "ALPHA_VANTAGE",
        answers,
    });
    let pipeline = Arc::new(DataSourcingPipeline::new(vec![source], cache.clone(), "USD"));

    let service = RefreshService::new(
        positions.clone(),
        pipeline,
        Arc::new(MetricsEngine::default()),
        Arc::new(CacheBackedFx(cache.clone())),
        Arc::new(HistoryRecorder::new(history.clone(), 100)),
        alerts.clone(),
        settings.clone(),
        RefreshConfig {
            unavailable_policy: policy,
            pacing: Duration::ZERO,
        },
    );

    Harness {
        positions,
        history,
        alerts,
        settings,
        cache,
        service,
    }
}

fn answers(entries: Vec<(&str, SourcedFields)>) -> HashMap<String, SourcedFields> {
    entries
        .into_iter()
        .map(|(ticker, fields)| (ticker.to_string(), fields))
        .collect()
}

// Tests

#[tokio::test]
async fn test_refresh_computes_persists_and_records_history() {
    let h = harness(
        vec![position("p1", "AAPL", UpdateFrequency::Daily)],
        answers(vec![("AAPL", quote(110.0, 121.0))]),
        UnavailablePolicy::PreserveStale,
    );

    let outcome = h.service.refresh_by_id("p1", None).await.unwrap();

    assert!(outcome.sourcing_error.is_none());
    let saved = h.positions.get_by_id("p1").unwrap();
    assert_eq!(saved.current_price, 110.0);
    assert!((saved.metrics.upside_potential - 10.0).abs() < 1e-9);
    assert!((saved.current_value_base - 1100.0).abs() < 1e-9);
    assert!((saved.unrealized_pnl_base - 300.0).abs() < 1e-9);
    assert_eq!(saved.provenance.data_source, "ALPHA_VANTAGE");
    assert!(!saved.provenance.stale);

    let rows = h.history.rows.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].expected_value, saved.metrics.expected_value);
}

#[tokio::test]
async fn test_large_ev_move_queues_alert() {
    // Prior EV is 6; the new fair value lifts it to 38.5
    let h = harness(
        vec![position("p1", "AAPL", UpdateFrequency::Daily)],
        answers(vec![("AAPL", quote(100.0, 170.0))]),
        UnavailablePolicy::PreserveStale,
    );

    let outcome = h.service.refresh_by_id("p1", None).await.unwrap();

    assert_eq!(outcome.alerts.len(), 1);
    assert_eq!(outcome.alerts[0].kind, AlertKind::EvChange);
    assert_eq!(h.alerts.alerts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_history_failure_still_counts_refresh_and_queues_alert() {
    let h = harness(
        vec![position("p1", "AAPL", UpdateFrequency::Daily)],
        answers(vec![("AAPL", quote(100.0, 170.0))]),
        UnavailablePolicy::PreserveStale,
    );
    h.history.fail_appends.store(true, Ordering::SeqCst);

    let outcome = h.service.refresh_by_id("p1", None).await.unwrap();

    assert!(outcome.sourcing_error.is_none());
    assert_eq!(outcome.alerts.len(), 1);
    assert_eq!(outcome.alerts[0].kind, AlertKind::EvChange);
    assert_eq!(h.alerts.alerts.lock().unwrap().len(), 1);
    assert_eq!(h.positions.get_by_id("p1").unwrap().fair_value, 170.0);
    assert!(h.history.rows.lock().unwrap().is_empty());

    let report = h.service.refresh_all_due(UpdateFrequency::Daily).await.unwrap();
    assert_eq!(report.updated, 1);
    assert_eq!(report.errors, 0);
}

#[tokio::test]
async fn test_failed_refresh_preserves_stale_values() {
    let original = position("p1", "GONE", UpdateFrequency::Daily);
    let h = harness(
        vec![original.clone()],
        HashMap::new(),
        UnavailablePolicy::PreserveStale,
    );

    let outcome = h.service.refresh_by_id("p1", None).await.unwrap();

    assert!(matches!(
        outcome.sourcing_error,
        Some(crate::errors::SourcingError::Unavailable { .. })
    ));
    let saved = h.positions.get_by_id("p1").unwrap();
    assert_eq!(saved.current_price, original.current_price);
    assert_eq!(saved.metrics, original.metrics);
    assert!(saved.provenance.stale);
    assert!(saved.provenance.last_error.is_some());
    assert!(h.history.rows.lock().unwrap().is_empty());
    assert!(h.alerts.alerts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_refresh_can_overwrite_with_unavailable() {
    let h = harness(
        vec![position("p1", "GONE", UpdateFrequency::Daily)],
        HashMap::new(),
        UnavailablePolicy::Overwrite,
    );

    h.service.refresh_by_id("p1", None).await.unwrap();

    let saved = h.positions.get_by_id("p1").unwrap();
    assert_eq!(saved.metrics.assessment, Assessment::Unavailable);
    assert_eq!(saved.current_price, 0.0);
    assert_eq!(saved.provenance.data_source, "None");
    assert_eq!(saved.provenance.fair_value_source, "Not available");
    assert_eq!(saved.shares_owned, 10.0);
}

fn supplied(price: f64, fair_value: f64, metrics: DerivedMetrics) -> SourcedFields {
    SourcedFields {
        current_price: Some(price),
        currency: Some("EUR".to_string()),
        fair_value: Some(fair_value),
        probability_positive: Some(0.65),
        downside_risk: Some(-20.0),
        derived: Some(metrics),
        fx_rate_to_base: Some(1.1),
        data_source: "XAI".to_string(),
        analysis_fetched_at: Some(Utc::now()),
        ..SourcedFields::default()
    }
}

#[tokio::test]
async fn test_consistent_supplied_metrics_are_adopted() {
    let metrics = DerivedMetrics {
        upside_potential: 20.0,
        effective_downside_risk: -20.0,
        b_ratio: 1.0,
        expected_value: 6.1,
        kelly_fraction: 30.0,
        half_kelly_suggested: 15.0,
        buy_zone_min: 80.0,
        buy_zone_max: 88.0,
        assessment: Assessment::Hold,
    };
    let h = harness(
        vec![position("p1", "SAP", UpdateFrequency::Daily)],
        answers(vec![("SAP", supplied(100.0, 120.0, metrics.clone()))]),
        UnavailablePolicy::PreserveStale,
    );

    h.service.refresh_by_id("p1", None).await.unwrap();

    let saved = h.positions.get_by_id("p1").unwrap();
    assert_eq!(saved.metrics, metrics);
    assert_eq!(saved.currency, "EUR");
    assert_eq!(h.cache.get("EUR"), Some(1.1));
    assert!((saved.current_value_base - 1100.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_inconsistent_supplied_metrics_are_recomputed() {
    let metrics = DerivedMetrics {
        upside_potential: 20.0,
        effective_downside_risk: -20.0,
        b_ratio: 1.0,
        expected_value: 6.0,
        kelly_fraction: 30.0,
        half_kelly_suggested: 25.0,
        buy_zone_min: 80.0,
        buy_zone_max: 88.0,
        assessment: Assessment::Add,
    };
    let h = harness(
        vec![position("p1", "SAP", UpdateFrequency::Daily)],
        answers(vec![("SAP", supplied(100.0, 120.0, metrics))]),
        UnavailablePolicy::PreserveStale,
    );

    h.service.refresh_by_id("p1", None).await.unwrap();

    let saved = h.positions.get_by_id("p1").unwrap();
    assert_eq!(saved.metrics.half_kelly_suggested, 15.0);
    assert_eq!(saved.metrics.assessment, Assessment::Hold);
}

#[tokio::test]
async fn test_batch_counts_and_isolates_failures() {
    let h = harness(
        vec![
            position("p1", "AAPL", UpdateFrequency::Daily),
            position("p2", "BAD", UpdateFrequency::Daily),
            position("p3", "MSFT", UpdateFrequency::Daily),
            position("p4", "SAP", UpdateFrequency::Weekly),
        ],
        answers(vec![
            ("AAPL", quote(100.0, 120.0)),
            ("MSFT", quote(300.0, 330.0)),
            ("SAP", quote(100.0, 120.0)),
        ]),
        UnavailablePolicy::PreserveStale,
    );

    let report = h.service.refresh_all_due(UpdateFrequency::Daily).await.unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.updated, 2);
    assert_eq!(report.errors, 1);
    assert_eq!(report.failures[0].0, "BAD");
    assert_eq!(h.history.rows.lock().unwrap().len(), 2);
    assert!(h.settings.get_settings().unwrap().last_update_run.is_some());
}

#[tokio::test]
async fn test_empty_tier_reports_zero() {
    let h = harness(Vec::new(), HashMap::new(), UnavailablePolicy::PreserveStale);

    let report = h.service.refresh_all_due(UpdateFrequency::Monthly).await.unwrap();

    assert_eq!(report, BatchReport::new(UpdateFrequency::Monthly, 0));
}
