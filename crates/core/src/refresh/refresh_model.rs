use assessapp_market_data::FetchDiagnostics;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::alerts::Alert;
use crate::errors::{SourcingError, ValidationError};
use crate::positions::{Position, UpdateFrequency};

/// What gets persisted when every source fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailablePolicy {
    /// Keep the previous values, flag them stale and record the error
    #[default]
    PreserveStale,
    /// Persist the explicit Unavailable state
    Overwrite,
}

impl fmt::Display for UnavailablePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailablePolicy::PreserveStale => f.write_str("preserve"),
            UnavailablePolicy::Overwrite => f.write_str("overwrite"),
        }
    }
}

impl FromStr for UnavailablePolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preserve" | "preserve_stale" | "stale" => Ok(UnavailablePolicy::PreserveStale),
            "overwrite" | "unavailable" => Ok(UnavailablePolicy::Overwrite),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown refresh failure policy '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RefreshConfig {
    pub unavailable_policy: UnavailablePolicy,
    /// Delay between two positions of a batch
    pub pacing: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            unavailable_policy: UnavailablePolicy::default(),
            pacing: Duration::from_secs(1),
        }
    }
}

/// Result of refreshing one position.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    /// The position as persisted
    pub position: Position,
    pub alerts: Vec<Alert>,
    /// Set when every source failed and the fallback was applied
    pub sourcing_error: Option<SourcingError>,
    pub diagnostics: FetchDiagnostics,
}

/// Counts for one scheduled batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub tier: UpdateFrequency,
    pub total: usize,
    pub updated: usize,
    pub errors: usize,
    /// `(ticker, error)` for each failed entry
    pub failures: Vec<(String, String)>,
}

impl BatchReport {
    pub fn new(tier: UpdateFrequency, total: usize) -> Self {
        Self {
            tier,
            total,
            updated: 0,
            errors: 0,
            failures: Vec::new(),
        }
    }
}
