use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::Arc;

use super::alerts_model::{AlertKind, DeliveryReport, NewAlert};
use super::alerts_traits::{AlertRepositoryTrait, NotificationTransport};
use crate::errors::Result;
use crate::positions::Position;
use crate::settings::{PortfolioSettings, SettingsServiceTrait};

/// Decides which alerts a freshly refreshed position raises. Pure.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertEvaluator;

impl AlertEvaluator {
    /// `prior_ev` is the expected value captured right before the refresh.
    pub fn evaluate(
        &self,
        position: &Position,
        prior_ev: Option<f64>,
        settings: &PortfolioSettings,
    ) -> Vec<NewAlert> {
        let mut alerts = Vec::new();
        let m = &position.metrics;

        if settings.alerts_enabled {
            if let Some(prior) = prior_ev {
                let delta = (m.expected_value - prior).abs();
                if delta > settings.alert_threshold_ev {
                    alerts.push(NewAlert {
                        position_id: position.id.clone(),
                        ticker: position.ticker.clone(),
                        kind: AlertKind::EvChange,
                        message: format!(
                            "EV changed from {:.2}% to {:.2}%",
                            prior, m.expected_value
                        ),
                    });
                }
            }
        }

        let price = position.current_price;
        if price > 0.0 && m.buy_zone_max > 0.0 && m.buy_zone_min <= price && price <= m.buy_zone_max
        {
            alerts.push(NewAlert {
                position_id: position.id.clone(),
                ticker: position.ticker.clone(),
                kind: AlertKind::BuyZone,
                message: format!("{} is in buy zone at {:.2}", position.ticker, price),
            });
        }

        alerts
    }
}

#[async_trait]
pub trait AlertDeliveryServiceTrait: Send + Sync {
    /// Try every queued alert once. Failures stay queued for the next sweep.
    async fn deliver_pending(&self) -> Result<DeliveryReport>;
}

/// Sweeps undelivered alerts through a transport.
pub struct AlertDeliveryService {
    repository: Arc<dyn AlertRepositoryTrait>,
    transport: Arc<dyn NotificationTransport>,
    settings_service: Arc<dyn SettingsServiceTrait>,
}

impl AlertDeliveryService {
    pub fn new(
        repository: Arc<dyn AlertRepositoryTrait>,
        transport: Arc<dyn NotificationTransport>,
        settings_service: Arc<dyn SettingsServiceTrait>,
    ) -> Self {
        Self {
            repository,
            transport,
            settings_service,
        }
    }
}

#[async_trait]
impl AlertDeliveryServiceTrait for AlertDeliveryService {
    async fn deliver_pending(&self) -> Result<DeliveryReport> {
        let mut report = DeliveryReport::default();
        if !self.settings_service.get_settings()?.alerts_enabled {
            debug!("Alerts disabled, skipping delivery sweep");
            return Ok(report);
        }

        let pending = self.repository.list_undelivered()?;
        if pending.is_empty() {
            return Ok(report);
        }

        for alert in pending {
            match self.transport.send(&alert).await {
                Ok(()) => {
                    self.repository.mark_delivered(&alert.id).await?;
                    report.sent += 1;
                }
                Err(e) => {
                    warn!(
                        "Delivery of {} alert {} for {} via {} failed: {}",
                        alert.kind,
                        alert.id,
                        alert.ticker,
                        self.transport.name(),
                        e
                    );
                    report.failed += 1;
                }
            }
        }

        info!(
            "Alert sweep via {}: {} sent, {} failed",
            self.transport.name(),
            report.sent,
            report.failed
        );
        Ok(report)
    }
}
