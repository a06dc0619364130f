use serde::{Deserialize, Serialize};

/// Strategy constants that are embedded into the analysis prompt so the
/// provider computes its derived fields with the same rules as the local engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyRules {
    /// EV above which the assessment is Add
    pub add_threshold: f64,
    /// EV at or below which the assessment is Sell
    pub sell_threshold: f64,
    /// EV targeted when deriving the buy zone
    pub target_ev: f64,
    /// Upper bound for half-Kelly sizing, in percent
    pub half_kelly_cap: f64,
    /// Probability used when analysts give no signal
    pub default_probability: f64,
}

impl Default for StrategyRules {
    fn default() -> Self {
        Self {
            add_threshold: 7.0,
            sell_threshold: -5.0,
            target_ev: 15.0,
            half_kelly_cap: 15.0,
            default_probability: 0.65,
        }
    }
}

/// Input to a generative-analysis provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub ticker: String,
    pub company_name: String,
    pub sector: Option<String>,
    pub currency: String,
    /// Currency the provider should quote `exchange_rate_to_base` against
    pub base_currency: String,
    pub rules: StrategyRules,
}

/// Strict response schema for a generative analysis.
///
/// Raw market inputs and the provider's own derived metrics are required;
/// a response missing any of them fails to deserialize and is treated as a
/// schema error. Fundamentals that are legitimately unavailable for some
/// securities are optional.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockAnalysis {
    pub ticker: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    pub current_price: f64,
    pub currency: String,
    /// Units of the base currency per one unit of `currency`
    #[serde(default, alias = "exchange_rate_to_usd")]
    pub exchange_rate_to_base: Option<f64>,
    pub fair_value: f64,
    pub beta: f64,
    #[serde(default)]
    pub volatility: Option<f64>,
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    #[serde(default)]
    pub eps_growth_rate: Option<f64>,
    #[serde(default)]
    pub debt_to_ebitda: Option<f64>,
    #[serde(default)]
    pub dividend_yield: Option<f64>,
    pub probability_positive: f64,
    pub downside_risk: f64,
    pub upside_potential: f64,
    pub b_ratio: f64,
    pub expected_value: f64,
    pub kelly_fraction: f64,
    pub half_kelly_suggested: f64,
    pub buy_zone_min: f64,
    pub buy_zone_max: f64,
    pub assessment: String,
}
