use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use std::sync::Arc;

use super::SettingsRepositoryTrait;
use crate::errors::Result;
use crate::settings::{PortfolioSettings, SettingsUpdate};

#[async_trait]
pub trait SettingsServiceTrait: Send + Sync {
    fn get_settings(&self) -> Result<PortfolioSettings>;

    async fn update_settings(&self, update: &SettingsUpdate) -> Result<PortfolioSettings>;

    async fn record_update_run(&self, at: DateTime<Utc>) -> Result<()>;
}

pub struct SettingsService {
    settings_repository: Arc<dyn SettingsRepositoryTrait>,
}

impl SettingsService {
    pub fn new(settings_repository: Arc<dyn SettingsRepositoryTrait>) -> Self {
        Self {
            settings_repository,
        }
    }
}

#[async_trait]
impl SettingsServiceTrait for SettingsService {
    fn get_settings(&self) -> Result<PortfolioSettings> {
        self.settings_repository.get_settings()
    }

    async fn update_settings(&self, update: &SettingsUpdate) -> Result<PortfolioSettings> {
        update.validate()?;
        let mut settings = self.settings_repository.get_settings()?;
        update.apply_to(&mut settings);
        debug!("Updating portfolio settings: {:?}", settings);
        self.settings_repository.update_settings(settings).await
    }

    async fn record_update_run(&self, at: DateTime<Utc>) -> Result<()> {
        self.settings_repository.record_update_run(at).await
    }
}
