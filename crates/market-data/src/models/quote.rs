use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest traded price for a symbol.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,

    /// Last traded price in the quote currency
    pub price: f64,

    /// Quote currency when the provider reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Provider timestamp of the price, or fetch time when the provider has none
    pub timestamp: DateTime<Utc>,

    /// Source of the quote (ALPHA_VANTAGE, XAI, ...)
    pub source: String,
}

impl Quote {
    /// A quote is only usable when it carries a strictly positive, finite price.
    pub fn is_usable(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}
