use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Units of the base currency for one unit of `currency_code`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub currency_code: String,
    pub rate: f64,
    /// Manual overrides win over every fetched or cached rate
    pub is_manual: bool,
    pub source: String,
    pub updated_at: DateTime<Utc>,
}

impl ExchangeRate {
    pub fn manual(currency_code: &str, rate: f64) -> Self {
        Self {
            currency_code: currency_code.to_uppercase(),
            rate,
            is_manual: true,
            source: crate::constants::DATA_SOURCE_MANUAL.to_string(),
            updated_at: Utc::now(),
        }
    }

    pub fn is_usable(&self) -> bool {
        self.rate.is_finite() && self.rate > 0.0
    }
}
