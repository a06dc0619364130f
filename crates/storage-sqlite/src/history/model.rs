use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::positions::parse_assessment;
use crate::utils::{format_timestamp, parse_timestamp};
use assessapp_core::history::HistorySnapshot;

#[derive(
    Queryable, Insertable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::history_snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct HistorySnapshotDB {
    pub id: String,
    pub position_id: String,
    pub ticker: String,
    pub current_price: f64,
    pub fair_value: f64,
    pub upside_potential: f64,
    pub downside_risk: f64,
    pub probability_positive: f64,
    pub expected_value: f64,
    pub kelly_fraction: f64,
    pub half_kelly_suggested: f64,
    pub weight: f64,
    pub assessment: String,
    pub recorded_at: String,
}

impl From<HistorySnapshotDB> for HistorySnapshot {
    fn from(db: HistorySnapshotDB) -> Self {
        Self {
            assessment: parse_assessment(&db.assessment),
            recorded_at: parse_timestamp(&db.recorded_at),
            id: db.id,
            position_id: db.position_id,
            ticker: db.ticker,
            current_price: db.current_price,
            fair_value: db.fair_value,
            upside_potential: db.upside_potential,
            downside_risk: db.downside_risk,
            probability_positive: db.probability_positive,
            expected_value: db.expected_value,
            kelly_fraction: db.kelly_fraction,
            half_kelly_suggested: db.half_kelly_suggested,
            weight: db.weight,
        }
    }
}

impl From<HistorySnapshot> for HistorySnapshotDB {
    fn from(domain: HistorySnapshot) -> Self {
        Self {
            id: domain.id,
            position_id: domain.position_id,
            ticker: domain.ticker,
            current_price: domain.current_price,
            fair_value: domain.fair_value,
            upside_potential: domain.upside_potential,
            downside_risk: domain.downside_risk,
            probability_positive: domain.probability_positive,
            expected_value: domain.expected_value,
            kelly_fraction: domain.kelly_fraction,
            half_kelly_suggested: domain.half_kelly_suggested,
            weight: domain.weight,
            assessment: domain.assessment.as_str().to_string(),
            recorded_at: format_timestamp(&domain.recorded_at),
        }
    }
}
