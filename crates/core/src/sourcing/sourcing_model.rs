use assessapp_market_data::FetchDiagnostics;
use chrono::{DateTime, Utc};
use std::fmt;

use crate::errors::SourcingError;
use crate::positions::{DerivedMetrics, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Quantitative quote and fundamentals
    MarketData,
    /// Generative analysis answering with raw and derived fields
    Analysis,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::MarketData => "market_data",
            SourceKind::Analysis => "analysis",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial position data returned by a source. Only populated fields are merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourcedFields {
    pub current_price: Option<f64>,
    pub currency: Option<String>,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub fair_value: Option<f64>,
    pub beta: Option<f64>,
    pub volatility: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub eps_growth_rate: Option<f64>,
    pub debt_to_ebitda: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub probability_positive: Option<f64>,
    pub downside_risk: Option<f64>,

    /// Derived metrics computed by the provider itself
    pub derived: Option<DerivedMetrics>,
    /// Units of the base currency per one unit of the position currency
    pub fx_rate_to_base: Option<f64>,

    pub data_source: String,
    pub fair_value_source: Option<String>,
    pub quote_fetched_at: Option<DateTime<Utc>>,
    pub fundamentals_fetched_at: Option<DateTime<Utc>>,
    pub analysis_fetched_at: Option<DateTime<Utc>>,
}

fn merge<T>(target: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *target = v;
    }
}

impl SourcedFields {
    pub fn usable_price(&self) -> Option<f64> {
        self.current_price.filter(|p| p.is_finite() && *p > 0.0)
    }

    /// Write every populated field and the provenance into `position`.
    pub fn apply_to(self, position: &mut Position) {
        merge(&mut position.current_price, self.current_price);
        merge(
            &mut position.currency,
            self.currency
                .map(|c| c.trim().to_uppercase())
                .filter(|c| !c.is_empty()),
        );
        merge(
            &mut position.company_name,
            self.company_name.filter(|n| !n.trim().is_empty()),
        );
        if let Some(sector) = self.sector.filter(|s| !s.trim().is_empty()) {
            position.sector = Some(sector);
        }
        merge(&mut position.fair_value, self.fair_value);
        merge(&mut position.beta, self.beta);
        merge(&mut position.volatility, self.volatility);
        merge(&mut position.pe_ratio, self.pe_ratio);
        merge(&mut position.eps_growth_rate, self.eps_growth_rate);
        merge(&mut position.debt_to_ebitda, self.debt_to_ebitda);
        merge(&mut position.dividend_yield, self.dividend_yield);
        merge(&mut position.probability_positive, self.probability_positive);
        if let Some(downside) = self.downside_risk {
            position.downside_risk = Some(downside);
        }
        merge(&mut position.metrics, self.derived);

        let provenance = &mut position.provenance;
        provenance.data_source = self.data_source;
        merge(&mut provenance.fair_value_source, self.fair_value_source);
        if self.quote_fetched_at.is_some() {
            provenance.quote_fetched_at = self.quote_fetched_at;
        }
        if self.fundamentals_fetched_at.is_some() {
            provenance.fundamentals_fetched_at = self.fundamentals_fetched_at;
        }
        if self.analysis_fetched_at.is_some() {
            provenance.analysis_fetched_at = self.analysis_fetched_at;
        }
        provenance.stale = false;
        provenance.last_error = None;
    }
}

/// Result of one sourcing pass over a position.
#[derive(Debug, Clone)]
pub struct SourcingOutcome {
    /// Freshly sourced position, or the explicit Unavailable state
    pub position: Position,
    /// The winning source supplied derived metrics
    pub derived_supplied: bool,
    pub diagnostics: FetchDiagnostics,
    /// Set when every source was exhausted
    pub error: Option<SourcingError>,
}

impl SourcingOutcome {
    pub fn is_unavailable(&self) -> bool {
        self.error.is_some()
    }
}
