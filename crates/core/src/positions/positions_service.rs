use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use std::sync::Arc;
use uuid::Uuid;

use super::positions_model::{NewPosition, Position};
use super::positions_traits::PositionRepositoryTrait;
use super::positions_update::PositionUpdate;
use crate::constants::DATA_SOURCE_MANUAL;
use crate::errors::Result;
use crate::fx::FxServiceTrait;
use crate::metrics::MetricsEngine;
use crate::settings::SettingsServiceTrait;

#[async_trait]
pub trait PositionServiceTrait: Send + Sync {
    fn get_position(&self, position_id: &str) -> Result<Position>;

    fn list_positions(&self, is_active_filter: Option<bool>) -> Result<Vec<Position>>;

    async fn create_position(&self, new_position: NewPosition) -> Result<Position>;

    async fn apply_update(&self, position_id: &str, update: PositionUpdate) -> Result<Position>;

    async fn set_active(&self, position_id: &str, is_active: bool) -> Result<Position>;

    async fn delete_position(&self, position_id: &str) -> Result<()>;
}

/// CRUD over positions. Every write goes through the metrics engine so stored
/// derived fields always match the stored raw inputs.
pub struct PositionService {
    repository: Arc<dyn PositionRepositoryTrait>,
    engine: Arc<MetricsEngine>,
    fx_service: Arc<dyn FxServiceTrait>,
    settings_service: Arc<dyn SettingsServiceTrait>,
}

impl PositionService {
    pub fn new(
        repository: Arc<dyn PositionRepositoryTrait>,
        engine: Arc<MetricsEngine>,
        fx_service: Arc<dyn FxServiceTrait>,
        settings_service: Arc<dyn SettingsServiceTrait>,
    ) -> Self {
        Self {
            repository,
            engine,
            fx_service,
            settings_service,
        }
    }

    fn recompute(&self, position: &Position) -> Position {
        let computed = self.engine.compute(position);
        for warning in self.engine.validate(&computed) {
            warn!("{}: {}", computed.ticker, warning);
        }
        computed
    }

    async fn revalue(&self, position: &mut Position) {
        let rate = self.fx_service.rate_to_base(&position.currency).await;
        position.revalue(rate);
    }
}

#[async_trait]
impl PositionServiceTrait for PositionService {
    fn get_position(&self, position_id: &str) -> Result<Position> {
        self.repository.get_by_id(position_id)
    }

    fn list_positions(&self, is_active_filter: Option<bool>) -> Result<Vec<Position>> {
        self.repository.list(is_active_filter)
    }

    async fn create_position(&self, new_position: NewPosition) -> Result<Position> {
        new_position.validate()?;
        let default_frequency = self.settings_service.get_settings()?.update_frequency;
        let id = new_position
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let position = new_position.into_position(id, default_frequency);
        let mut position = self.recompute(&position);
        self.revalue(&mut position).await;

        debug!(
            "Creating position {} ({}) assessed {}",
            position.ticker, position.id, position.metrics.assessment
        );
        self.repository.create(position).await
    }

    async fn apply_update(&self, position_id: &str, update: PositionUpdate) -> Result<Position> {
        update.validate()?;
        let mut position = self.repository.get_by_id(position_id)?;

        let recompute = update.affects_metrics();
        let revalue = update.affects_valuation() || recompute;
        match &update {
            PositionUpdate::CurrentPrice(_) => {
                position.provenance.data_source = DATA_SOURCE_MANUAL.to_string();
            }
            PositionUpdate::FairValue(_) => {
                position.provenance.fair_value_source = DATA_SOURCE_MANUAL.to_string();
            }
            _ => {}
        }
        debug!(
            "Updating {} on position {}",
            update.field_name(),
            position.ticker
        );
        update.apply(&mut position);

        if recompute {
            position = self.recompute(&position);
        }
        if revalue {
            self.revalue(&mut position).await;
        }
        position.updated_at = Utc::now();

        self.repository.update(position).await
    }

    async fn set_active(&self, position_id: &str, is_active: bool) -> Result<Position> {
        let mut position = self.repository.get_by_id(position_id)?;
        position.is_active = is_active;
        if !is_active {
            position.weight = 0.0;
        }
        position.updated_at = Utc::now();
        self.repository.update(position).await
    }

    async fn delete_position(&self, position_id: &str) -> Result<()> {
        self.repository.delete(position_id).await?;
        Ok(())
    }
}
