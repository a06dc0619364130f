use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use super::model::{PortfolioSettingsDB, SETTINGS_ROW_ID};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::portfolio_settings::dsl::*;
use crate::utils::format_timestamp;
use assessapp_core::errors::Result;
use assessapp_core::settings::{PortfolioSettings, SettingsRepositoryTrait};

pub struct SettingsRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SettingsRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        SettingsRepository { pool, writer }
    }
}

#[async_trait]
impl SettingsRepositoryTrait for SettingsRepository {
    fn get_settings(&self) -> Result<PortfolioSettings> {
        let mut conn = get_connection(&self.pool)?;
        let row = portfolio_settings
            .find(SETTINGS_ROW_ID)
            .select(PortfolioSettingsDB::as_select())
            .first::<PortfolioSettingsDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        Ok(row.map(PortfolioSettings::from).unwrap_or_default())
    }

    async fn update_settings(&self, settings: PortfolioSettings) -> Result<PortfolioSettings> {
        let row = PortfolioSettingsDB::from(&settings);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PortfolioSettings> {
                diesel::replace_into(portfolio_settings)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(settings)
            })
            .await
    }

    async fn record_update_run(&self, at: DateTime<Utc>) -> Result<()> {
        let stamp = format_timestamp(&at);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let affected = diesel::update(portfolio_settings.find(SETTINGS_ROW_ID))
                    .set(last_update_run.eq(Some(stamp.clone())))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if affected == 0 {
                    let mut row = PortfolioSettingsDB::from(&PortfolioSettings::default());
                    row.last_update_run = Some(stamp);
                    diesel::insert_into(portfolio_settings)
                        .values(&row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(())
            })
            .await
    }
}
