use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Company fundamentals relevant to the EV model.
///
/// Every field is optional; providers fill what they have and the caller
/// merges only the populated fields.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Fundamentals {
    pub symbol: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub beta: Option<f64>,
    /// Consensus analyst target price, used as fair value
    pub target_price: Option<f64>,
    pub pe_ratio: Option<f64>,
    /// Dividend yield in percent
    pub dividend_yield: Option<f64>,
    /// Year-over-year EPS growth in percent
    pub eps_growth_rate: Option<f64>,
    pub source: String,
    pub fetched_at: DateTime<Utc>,
}
