use diesel::prelude::*;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::utils::{format_optional_timestamp, parse_optional_timestamp};
use assessapp_core::settings::PortfolioSettings;

/// Primary key of the only settings row.
pub const SETTINGS_ROW_ID: i32 = 1;

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::portfolio_settings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSettingsDB {
    pub id: i32,
    pub update_frequency: String,
    pub alerts_enabled: bool,
    pub alert_threshold_ev: f64,
    pub last_update_run: Option<String>,
}

impl From<PortfolioSettingsDB> for PortfolioSettings {
    fn from(db: PortfolioSettingsDB) -> Self {
        let update_frequency = db.update_frequency.parse().unwrap_or_else(|_| {
            warn!(
                "Unknown stored update frequency '{}', using daily",
                db.update_frequency
            );
            Default::default()
        });
        Self {
            update_frequency,
            alerts_enabled: db.alerts_enabled,
            alert_threshold_ev: db.alert_threshold_ev,
            last_update_run: parse_optional_timestamp(db.last_update_run.as_deref()),
        }
    }
}

impl From<&PortfolioSettings> for PortfolioSettingsDB {
    fn from(settings: &PortfolioSettings) -> Self {
        Self {
            id: SETTINGS_ROW_ID,
            update_frequency: settings.update_frequency.as_str().to_string(),
            alerts_enabled: settings.alerts_enabled,
            alert_threshold_ev: settings.alert_threshold_ev,
            last_update_run: format_optional_timestamp(&settings.last_update_run),
        }
    }
}
