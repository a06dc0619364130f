//! Repository traits for settings.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::settings::PortfolioSettings;

/// Repository trait for the portfolio settings singleton.
#[async_trait]
pub trait SettingsRepositoryTrait: Send + Sync {
    /// Get the settings, falling back to defaults when none were saved.
    fn get_settings(&self) -> Result<PortfolioSettings>;

    async fn update_settings(&self, settings: PortfolioSettings) -> Result<PortfolioSettings>;

    /// Stamp the completion time of a scheduled batch.
    async fn record_update_run(&self, at: DateTime<Utc>) -> Result<()>;
}
