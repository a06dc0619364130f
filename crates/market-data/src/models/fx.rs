use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Units of `to` per one unit of `from`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FxRate {
    pub from: String,
    pub to: String,
    pub rate: f64,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}
