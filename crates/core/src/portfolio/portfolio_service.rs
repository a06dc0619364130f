use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

use super::portfolio_model::{PortfolioMetrics, PositionWeight};
use crate::constants::UNKNOWN_SECTOR;
use crate::errors::Result;
use crate::fx::FxServiceTrait;
use crate::positions::{Position, PositionRepositoryTrait};

/// Pure aggregation over positions and a currency -> base rate map.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortfolioAggregator;

impl PortfolioAggregator {
    /// Inactive positions are ignored. A currency missing from `rates`
    /// converts at 1.0.
    pub fn aggregate(&self, positions: &[Position], rates: &HashMap<String, f64>) -> PortfolioMetrics {
        let active: Vec<&Position> = positions.iter().filter(|p| p.is_active).collect();

        let values: Vec<f64> = active
            .iter()
            .map(|p| {
                let rate = rates
                    .get(&p.currency.to_uppercase())
                    .copied()
                    .filter(|r| r.is_finite() && *r > 0.0)
                    .unwrap_or(1.0);
                let value = p.shares_owned * p.current_price * rate;
                if value.is_finite() {
                    value
                } else {
                    0.0
                }
            })
            .collect();
        let total_value: f64 = values.iter().sum();

        let mut metrics = PortfolioMetrics {
            total_value,
            ..PortfolioMetrics::default()
        };

        for (position, value) in active.iter().zip(&values) {
            let weight = if total_value > 0.0 {
                value / total_value * 100.0
            } else {
                0.0
            };

            metrics.weighted_ev += position.metrics.expected_value * weight / 100.0;
            metrics.weighted_volatility += position.volatility * weight / 100.0;
            metrics.kelly_utilization += weight;

            let sector = position
                .sector
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(UNKNOWN_SECTOR);
            *metrics
                .sector_weights
                .entry(sector.to_string())
                .or_insert(0.0) += weight;

            metrics.position_weights.push(PositionWeight {
                position_id: position.id.clone(),
                ticker: position.ticker.clone(),
                value_base: *value,
                weight,
            });
        }

        metrics.risk_adjusted_return = if metrics.weighted_volatility != 0.0 {
            metrics.weighted_ev / metrics.weighted_volatility
        } else {
            0.0
        };

        metrics
    }
}

#[async_trait]
pub trait PortfolioServiceTrait: Send + Sync {
    /// Aggregate all active positions and persist their weights.
    async fn summary(&self) -> Result<PortfolioMetrics>;
}

pub struct PortfolioService {
    position_repository: Arc<dyn PositionRepositoryTrait>,
    fx_service: Arc<dyn FxServiceTrait>,
    aggregator: PortfolioAggregator,
}

impl PortfolioService {
    pub fn new(
        position_repository: Arc<dyn PositionRepositoryTrait>,
        fx_service: Arc<dyn FxServiceTrait>,
    ) -> Self {
        Self {
            position_repository,
            fx_service,
            aggregator: PortfolioAggregator,
        }
    }
}

#[async_trait]
impl PortfolioServiceTrait for PortfolioService {
    async fn summary(&self) -> Result<PortfolioMetrics> {
        let positions = self.position_repository.list(Some(true))?;
        let mut currencies: Vec<String> =
            positions.iter().map(|p| p.currency.to_uppercase()).collect();
        currencies.sort();
        currencies.dedup();

        let rates = self.fx_service.rates_for(&currencies).await;
        let metrics = self.aggregator.aggregate(&positions, &rates);

        let weights: Vec<(String, f64)> = metrics
            .position_weights
            .iter()
            .map(|w| (w.position_id.clone(), w.weight))
            .collect();
        let updated = self.position_repository.update_weights(weights).await?;
        debug!(
            "Portfolio of {} positions valued at {:.2} {}, {} weights stored",
            positions.len(),
            metrics.total_value,
            self.fx_service.base_currency(),
            updated
        );

        Ok(metrics)
    }
}
