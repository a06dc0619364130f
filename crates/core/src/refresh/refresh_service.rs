use async_trait::async_trait;
use chrono::Utc;
use log::{debug, error, info, warn};
use std::sync::Arc;

use super::refresh_model::{BatchReport, RefreshConfig, RefreshOutcome, UnavailablePolicy};
use crate::alerts::{AlertEvaluator, AlertRepositoryTrait};
use crate::errors::{Result, SourcingError};
use crate::fx::FxServiceTrait;
use crate::history::HistoryRecorder;
use crate::metrics::MetricsEngine;
use crate::positions::{Position, PositionRepositoryTrait, UpdateFrequency};
use crate::settings::{PortfolioSettings, SettingsServiceTrait};
use crate::sourcing::{DataSourcingPipeline, SourcingOutcome};

#[async_trait]
pub trait RefreshServiceTrait: Send + Sync {
    async fn refresh_by_id(
        &self,
        position_id: &str,
        preferred: Option<&str>,
    ) -> Result<RefreshOutcome>;

    /// Refresh one position. A sourcing failure is not an `Err`: it is reported
    /// in `sourcing_error` after the configured fallback has been persisted.
    async fn refresh_position(
        &self,
        position: &Position,
        preferred: Option<&str>,
    ) -> Result<RefreshOutcome>;

    /// Refresh every active position of a tier, one at a time. A failed entry
    /// is counted and logged; it never stops the batch.
    async fn refresh_all_due(&self, tier: UpdateFrequency) -> Result<BatchReport>;
}

/// Runs the per-position refresh sequence and scheduled batches.
pub struct RefreshService {
    repository: Arc<dyn PositionRepositoryTrait>,
    pipeline: Arc<DataSourcingPipeline>,
    engine: Arc<MetricsEngine>,
    fx_service: Arc<dyn FxServiceTrait>,
    history: Arc<HistoryRecorder>,
    alert_repository: Arc<dyn AlertRepositoryTrait>,
    evaluator: AlertEvaluator,
    settings_service: Arc<dyn SettingsServiceTrait>,
    config: RefreshConfig,
}

impl RefreshService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        repository: Arc<dyn PositionRepositoryTrait>,
        pipeline: Arc<DataSourcingPipeline>,
        engine: Arc<MetricsEngine>,
        fx_service: Arc<dyn FxServiceTrait>,
        history: Arc<HistoryRecorder>,
        alert_repository: Arc<dyn AlertRepositoryTrait>,
        settings_service: Arc<dyn SettingsServiceTrait>,
        config: RefreshConfig,
    ) -> Self {
        Self {
            repository,
            pipeline,
            engine,
            fx_service,
            history,
            alert_repository,
            evaluator: AlertEvaluator,
            settings_service,
            config,
        }
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    async fn persist_fallback(
        &self,
        previous: &Position,
        unavailable: Position,
        sourcing_error: &SourcingError,
    ) -> Result<Position> {
        let mut fallback = match self.config.unavailable_policy {
            UnavailablePolicy::PreserveStale => {
                let mut stale = previous.clone();
                stale.provenance.stale = true;
                stale.provenance.last_error = Some(sourcing_error.to_string());
                stale
            }
            UnavailablePolicy::Overwrite => unavailable,
        };
        fallback.updated_at = Utc::now();
        warn!(
            "Refresh of {} failed, applying {} policy: {}",
            previous.ticker, self.config.unavailable_policy, sourcing_error
        );
        self.repository.update(fallback).await
    }
}

#[async_trait]
impl RefreshServiceTrait for RefreshService {
    async fn refresh_by_id(
        &self,
        position_id: &str,
        preferred: Option<&str>,
    ) -> Result<RefreshOutcome> {
        let position = self.repository.get_by_id(position_id)?;
        self.refresh_position(&position, preferred).await
    }

    async fn refresh_position(
        &self,
        position: &Position,
        preferred: Option<&str>,
    ) -> Result<RefreshOutcome> {
        let prior_ev = position.prior_expected_value();
        let SourcingOutcome {
            position: sourced,
            derived_supplied,
            diagnostics,
            error,
        } = self.pipeline.refresh(position, preferred).await;

        if let Some(sourcing_error) = error {
            let saved = self
                .persist_fallback(position, sourced, &sourcing_error)
                .await?;
            return Ok(RefreshOutcome {
                position: saved,
                alerts: Vec::new(),
                sourcing_error: Some(sourcing_error),
                diagnostics,
            });
        }

        let mut refreshed = if derived_supplied {
            let issues = self.engine.supplied_metrics_issues(&sourced);
            if issues.is_empty() {
                sourced
            } else {
                warn!(
                    "Recomputing provider metrics for {}: {}",
                    sourced.ticker,
                    issues.join("; ")
                );
                self.engine.compute(&sourced)
            }
        } else {
            self.engine.compute(&sourced)
        };
        for warning in self.engine.validate(&refreshed) {
            warn!("{}: {}", refreshed.ticker, warning);
        }

        let rate = self.fx_service.rate_to_base(&refreshed.currency).await;
        refreshed.revalue(rate);
        refreshed.updated_at = Utc::now();

        let saved = self.repository.update(refreshed).await?;

        // The position is committed from here on; follow-up writes only warn.
        let settings = self.settings_service.get_settings().unwrap_or_else(|e| {
            warn!("Using default alert thresholds for {}: {}", saved.ticker, e);
            PortfolioSettings::default()
        });
        let mut alerts = Vec::new();
        for new_alert in self.evaluator.evaluate(&saved, prior_ev, &settings) {
            debug!("Queueing {} alert for {}", new_alert.kind, saved.ticker);
            let kind = new_alert.kind;
            match self.alert_repository.create(new_alert).await {
                Ok(alert) => alerts.push(alert),
                Err(e) => warn!("Failed to queue {} alert for {}: {}", kind, saved.ticker, e),
            }
        }

        if let Err(e) = self.history.record(&saved).await {
            warn!("Failed to record history for {}: {}", saved.ticker, e);
        }

        Ok(RefreshOutcome {
            position: saved,
            alerts,
            sourcing_error: None,
            diagnostics,
        })
    }

    async fn refresh_all_due(&self, tier: UpdateFrequency) -> Result<BatchReport> {
        let positions = self.repository.list_by_frequency(tier)?;
        let mut report = BatchReport::new(tier, positions.len());
        info!("Starting {} refresh of {} positions", tier, report.total);

        for (index, position) in positions.iter().enumerate() {
            if index > 0 && !self.config.pacing.is_zero() {
                tokio::time::sleep(self.config.pacing).await;
            }

            match self.refresh_position(position, None).await {
                Ok(outcome) => match outcome.sourcing_error {
                    None => report.updated += 1,
                    Some(e) => {
                        report.errors += 1;
                        report.failures.push((position.ticker.clone(), e.to_string()));
                    }
                },
                Err(e) => {
                    error!("Refresh of {} failed: {}", position.ticker, e);
                    report.errors += 1;
                    report.failures.push((position.ticker.clone(), e.to_string()));
                }
            }
        }

        if let Err(e) = self.settings_service.record_update_run(Utc::now()).await {
            warn!("Failed to record {} update run: {}", tier, e);
        }

        info!(
            "Finished {} refresh: {} updated, {} errors, {} total",
            tier, report.updated, report.errors, report.total
        );
        Ok(report)
    }
}
