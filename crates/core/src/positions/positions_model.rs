//! Position domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    DATA_SOURCE_MANUAL, DATA_SOURCE_NONE, DEFAULT_PROBABILITY_POSITIVE, FAIR_VALUE_SOURCE_NONE,
};
use super::positions_update::PositionUpdate;
use crate::errors::ValidationError;

/// Categorical recommendation derived from expected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Assessment {
    Add,
    Hold,
    Trim,
    Sell,
    /// No provider produced usable data. Never the result of a computation.
    #[default]
    Unavailable,
}

impl Assessment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Assessment::Add => "Add",
            Assessment::Hold => "Hold",
            Assessment::Trim => "Trim",
            Assessment::Sell => "Sell",
            Assessment::Unavailable => "Unavailable",
        }
    }
}

impl fmt::Display for Assessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Assessment {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(Assessment::Add),
            "hold" => Ok(Assessment::Hold),
            "trim" => Ok(Assessment::Trim),
            "sell" => Ok(Assessment::Sell),
            "unavailable" | "n/a" => Ok(Assessment::Unavailable),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown assessment '{}'",
                other
            ))),
        }
    }
}

/// Refresh cadence tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UpdateFrequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl UpdateFrequency {
    pub const ALL: [UpdateFrequency; 3] = [
        UpdateFrequency::Daily,
        UpdateFrequency::Weekly,
        UpdateFrequency::Monthly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateFrequency::Daily => "daily",
            UpdateFrequency::Weekly => "weekly",
            UpdateFrequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for UpdateFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdateFrequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(UpdateFrequency::Daily),
            "weekly" => Ok(UpdateFrequency::Weekly),
            "monthly" => Ok(UpdateFrequency::Monthly),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown update frequency '{}'",
                other
            ))),
        }
    }
}

/// Metrics derived by the engine (or adopted from a provider).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub upside_potential: f64,
    /// Downside actually used: explicit value or the beta calibration
    pub effective_downside_risk: f64,
    pub b_ratio: f64,
    pub expected_value: f64,
    pub kelly_fraction: f64,
    pub half_kelly_suggested: f64,
    pub buy_zone_min: f64,
    pub buy_zone_max: f64,
    pub assessment: Assessment,
}

/// Where the current field values came from and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub data_source: String,
    pub fair_value_source: String,
    pub quote_fetched_at: Option<DateTime<Utc>>,
    pub fundamentals_fetched_at: Option<DateTime<Utc>>,
    pub analysis_fetched_at: Option<DateTime<Utc>>,
    /// Set when the last refresh failed and previous values were kept
    pub stale: bool,
    pub last_error: Option<String>,
}

impl Default for Provenance {
    fn default() -> Self {
        Self {
            data_source: DATA_SOURCE_MANUAL.to_string(),
            fair_value_source: DATA_SOURCE_MANUAL.to_string(),
            quote_fetched_at: None,
            fundamentals_fetched_at: None,
            analysis_fetched_at: None,
            stale: false,
            last_error: None,
        }
    }
}

/// A portfolio holding with its raw inputs, derived metrics and provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub ticker: String,
    pub isin: Option<String>,
    pub company_name: String,
    pub sector: Option<String>,
    pub currency: String,
    pub update_frequency: UpdateFrequency,
    pub is_active: bool,

    // Raw market inputs
    pub current_price: f64,
    pub fair_value: f64,

    // Risk parameters
    pub probability_positive: f64,
    /// Explicit downside in percent (<= 0); calibrated from beta when unset
    pub downside_risk: Option<f64>,
    pub beta: f64,
    pub volatility: f64,
    pub pe_ratio: f64,
    pub eps_growth_rate: f64,
    pub debt_to_ebitda: f64,
    pub dividend_yield: f64,

    // Sizing
    pub shares_owned: f64,
    pub avg_price_local: f64,
    pub current_value_base: f64,
    pub unrealized_pnl_base: f64,
    pub weight: f64,

    #[serde(flatten)]
    pub metrics: DerivedMetrics,
    #[serde(flatten)]
    pub provenance: Provenance,

    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Position {
    /// Units of the base currency held, given the rate for this position's currency.
    pub fn revalue(&mut self, rate_to_base: f64) {
        let rate = if rate_to_base.is_finite() && rate_to_base > 0.0 {
            rate_to_base
        } else {
            1.0
        };
        self.current_value_base = self.shares_owned * self.current_price * rate;
        let cost_basis = self.shares_owned * self.avg_price_local * rate;
        self.unrealized_pnl_base = self.current_value_base - cost_basis;
    }

    /// EV to compare against after a refresh. `None` when the position has
    /// never been assessed.
    pub fn prior_expected_value(&self) -> Option<f64> {
        match self.metrics.assessment {
            Assessment::Unavailable => None,
            _ => Some(self.metrics.expected_value),
        }
    }

    /// Explicit Unavailable state: every market, risk and derived number is
    /// zeroed and provenance says no provider supplied data. Holdings
    /// (shares and average price) are kept.
    pub fn mark_unavailable(&mut self, reason: &str) {
        self.current_price = 0.0;
        self.fair_value = 0.0;
        self.probability_positive = 0.0;
        self.downside_risk = None;
        self.beta = 0.0;
        self.volatility = 0.0;
        self.pe_ratio = 0.0;
        self.eps_growth_rate = 0.0;
        self.debt_to_ebitda = 0.0;
        self.dividend_yield = 0.0;
        self.current_value_base = 0.0;
        self.unrealized_pnl_base = 0.0;
        self.weight = 0.0;
        self.metrics = DerivedMetrics {
            assessment: Assessment::Unavailable,
            ..DerivedMetrics::default()
        };
        self.provenance.data_source = DATA_SOURCE_NONE.to_string();
        self.provenance.fair_value_source = FAIR_VALUE_SOURCE_NONE.to_string();
        self.provenance.stale = false;
        self.provenance.last_error = Some(reason.to_string());
    }

    pub fn is_unavailable(&self) -> bool {
        self.metrics.assessment == Assessment::Unavailable
    }
}

/// Input for creating a position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPosition {
    pub id: Option<String>,
    pub ticker: String,
    pub isin: Option<String>,
    pub company_name: String,
    pub sector: Option<String>,
    pub currency: String,
    pub update_frequency: Option<UpdateFrequency>,
    pub current_price: f64,
    pub fair_value: f64,
    pub probability_positive: Option<f64>,
    pub downside_risk: Option<f64>,
    pub beta: f64,
    pub volatility: f64,
    pub shares_owned: f64,
    pub avg_price_local: f64,
    pub comment: Option<String>,
}

impl NewPosition {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.ticker.trim().is_empty() {
            return Err(ValidationError::MissingField("ticker".to_string()));
        }
        if self.currency.trim().is_empty() {
            return Err(ValidationError::MissingField("currency".to_string()));
        }

        // Same bounds as the single-field updates.
        let mut checks = vec![
            PositionUpdate::CompanyName(self.company_name.clone()),
            PositionUpdate::CurrentPrice(self.current_price),
            PositionUpdate::FairValue(self.fair_value),
            PositionUpdate::Beta(self.beta),
            PositionUpdate::Volatility(self.volatility),
            PositionUpdate::SharesOwned(self.shares_owned),
            PositionUpdate::AvgPriceLocal(self.avg_price_local),
            PositionUpdate::DownsideRisk(self.downside_risk),
        ];
        if let Some(p) = self.probability_positive {
            checks.push(PositionUpdate::ProbabilityPositive(p));
        }
        checks.iter().try_for_each(PositionUpdate::validate)
    }

    /// Build the domain position. Metrics are computed by the caller.
    pub fn into_position(self, id: String, default_frequency: UpdateFrequency) -> Position {
        let now = Utc::now();
        Position {
            id,
            ticker: self.ticker.trim().to_uppercase(),
            isin: self.isin,
            company_name: self.company_name,
            sector: self.sector,
            currency: self.currency.trim().to_uppercase(),
            update_frequency: self.update_frequency.unwrap_or(default_frequency),
            is_active: true,
            current_price: self.current_price,
            fair_value: self.fair_value,
            probability_positive: self
                .probability_positive
                .unwrap_or(DEFAULT_PROBABILITY_POSITIVE),
            downside_risk: self.downside_risk,
            beta: self.beta,
            volatility: self.volatility,
            pe_ratio: 0.0,
            eps_growth_rate: 0.0,
            debt_to_ebitda: 0.0,
            dividend_yield: 0.0,
            shares_owned: self.shares_owned,
            avg_price_local: self.avg_price_local,
            current_value_base: 0.0,
            unrealized_pnl_base: 0.0,
            weight: 0.0,
            metrics: DerivedMetrics::default(),
            provenance: Provenance::default(),
            comment: self.comment,
            created_at: now,
            updated_at: now,
        }
    }
}
