use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionWeight {
    pub position_id: String,
    pub ticker: String,
    pub value_base: f64,
    /// Percent of total portfolio value
    pub weight: f64,
}

/// Portfolio-level view, recomputed on every call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioMetrics {
    pub total_value: f64,
    pub weighted_ev: f64,
    pub weighted_volatility: f64,
    pub risk_adjusted_return: f64,
    /// Sum of current weights: allocation in use, not a Kelly re-derivation
    pub kelly_utilization: f64,
    pub sector_weights: BTreeMap<String, f64>,
    pub position_weights: Vec<PositionWeight>,
}
