use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::positions::{Assessment, Position};

/// Metrics of a position at one instant. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySnapshot {
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
    pub assessment: Assessment,
    pub recorded_at: DateTime<Utc>,
}

impl HistorySnapshot {
    pub fn capture(position: &Position, recorded_at: DateTime<Utc>) -> Self {
        let m = &position.metrics;
        Self {
            id: Uuid::new_v4().to_string(),
            position_id: position.id.clone(),
            ticker: position.ticker.clone(),
            current_price: position.current_price,
            fair_value: position.fair_value,
            upside_potential: m.upside_potential,
            downside_risk: m.effective_downside_risk,
            probability_positive: position.probability_positive,
            expected_value: m.expected_value,
            kelly_fraction: m.kelly_fraction,
            half_kelly_suggested: m.half_kelly_suggested,
            weight: position.weight,
            assessment: m.assessment,
            recorded_at,
        }
    }
}
