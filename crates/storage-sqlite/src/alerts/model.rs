use diesel::prelude::*;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::utils::{format_timestamp, parse_timestamp};
use assessapp_core::alerts::{Alert, AlertKind};

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::alerts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct AlertDB {
    pub id: String,
    pub position_id: String,
    pub ticker: String,
    pub alert_type: String,
    pub message: String,
    pub delivered: bool,
    pub created_at: String,
}

impl From<AlertDB> for Alert {
    fn from(db: AlertDB) -> Self {
        let kind = db.alert_type.parse().unwrap_or_else(|_| {
            warn!(
                "Unknown alert type '{}' on alert {}, reading as ev_change",
                db.alert_type, db.id
            );
            AlertKind::EvChange
        });
        Self {
            kind,
            created_at: parse_timestamp(&db.created_at),
            id: db.id,
            position_id: db.position_id,
            ticker: db.ticker,
            message: db.message,
            delivered: db.delivered,
        }
    }
}

impl From<&Alert> for AlertDB {
    fn from(alert: &Alert) -> Self {
        Self {
            id: alert.id.clone(),
            position_id: alert.position_id.clone(),
            ticker: alert.ticker.clone(),
            alert_type: alert.kind.as_str().to_string(),
            message: alert.message.clone(),
            delivered: alert.delivered,
            created_at: format_timestamp(&alert.created_at),
        }
    }
}
