use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::{format_timestamp, parse_timestamp};
use assessapp_core::fx::ExchangeRate;

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
#[diesel(table_name = crate::schema::exchange_rates)]
#[diesel(primary_key(currency_code))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateDB {
    pub currency_code: String,
    pub rate: f64,
    pub is_manual: bool,
    pub source: String,
    pub updated_at: String,
}

impl From<ExchangeRateDB> for ExchangeRate {
    fn from(db: ExchangeRateDB) -> Self {
        Self {
            updated_at: parse_timestamp(&db.updated_at),
            currency_code: db.currency_code,
            rate: db.rate,
            is_manual: db.is_manual,
            source: db.source,
        }
    }
}

impl From<ExchangeRate> for ExchangeRateDB {
    fn from(domain: ExchangeRate) -> Self {
        Self {
            currency_code: domain.currency_code.to_uppercase(),
            rate: domain.rate,
            is_manual: domain.is_manual,
            source: domain.source,
            updated_at: format_timestamp(&domain.updated_at),
        }
    }
}
