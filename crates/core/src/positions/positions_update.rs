//! Typed single-field updates for a position.

use serde::{Deserialize, Serialize};

use super::positions_model::{Position, UpdateFrequency};
use crate::errors::ValidationError;

/// One updatable field with its new value.
///
/// Serialized as `{"field": "fair_value", "value": 120.0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum PositionUpdate {
    CurrentPrice(f64),
    AvgPriceLocal(f64),
    FairValue(f64),
    SharesOwned(f64),
    Beta(f64),
    Volatility(f64),
    ProbabilityPositive(f64),
    /// `None` clears the explicit downside so the beta calibration applies
    DownsideRisk(Option<f64>),
    PeRatio(f64),
    EpsGrowthRate(f64),
    DebtToEbitda(f64),
    DividendYield(f64),
    Comment(Option<String>),
    CompanyName(String),
    Sector(Option<String>),
    UpdateFrequency(UpdateFrequency),
    Isin(Option<String>),
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            expected: ">= 0",
        })
    }
}

impl PositionUpdate {
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::CurrentPrice(_) => "current_price",
            Self::AvgPriceLocal(_) => "avg_price_local",
            Self::FairValue(_) => "fair_value",
            Self::SharesOwned(_) => "shares_owned",
            Self::Beta(_) => "beta",
            Self::Volatility(_) => "volatility",
            Self::ProbabilityPositive(_) => "probability_positive",
            Self::DownsideRisk(_) => "downside_risk",
            Self::PeRatio(_) => "pe_ratio",
            Self::EpsGrowthRate(_) => "eps_growth_rate",
            Self::DebtToEbitda(_) => "debt_to_ebitda",
            Self::DividendYield(_) => "dividend_yield",
            Self::Comment(_) => "comment",
            Self::CompanyName(_) => "company_name",
            Self::Sector(_) => "sector",
            Self::UpdateFrequency(_) => "update_frequency",
            Self::Isin(_) => "isin",
        }
    }

    /// Check the value against the field's bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let field = self.field_name();
        match self {
            Self::CurrentPrice(v)
            | Self::AvgPriceLocal(v)
            | Self::FairValue(v)
            | Self::SharesOwned(v)
            | Self::Beta(v)
            | Self::Volatility(v)
            | Self::PeRatio(v)
            | Self::DebtToEbitda(v)
            | Self::DividendYield(v) => non_negative(field, *v),
            Self::ProbabilityPositive(v) => {
                if v.is_finite() && (0.0..=1.0).contains(v) {
                    Ok(())
                } else {
                    Err(ValidationError::OutOfRange {
                        field,
                        value: *v,
                        expected: "between 0 and 1",
                    })
                }
            }
            Self::DownsideRisk(Some(v)) => {
                if v.is_finite() && *v <= 0.0 {
                    Ok(())
                } else {
                    Err(ValidationError::OutOfRange {
                        field,
                        value: *v,
                        expected: "<= 0",
                    })
                }
            }
            Self::EpsGrowthRate(v) => {
                if v.is_finite() {
                    Ok(())
                } else {
                    Err(ValidationError::OutOfRange {
                        field,
                        value: *v,
                        expected: "a finite number",
                    })
                }
            }
            Self::CompanyName(name) if name.trim().is_empty() => {
                Err(ValidationError::MissingField(field.to_string()))
            }
            Self::DownsideRisk(None)
            | Self::Comment(_)
            | Self::CompanyName(_)
            | Self::Sector(_)
            | Self::UpdateFrequency(_)
            | Self::Isin(_) => Ok(()),
        }
    }

    /// Whether the derived metrics must be recomputed after this update.
    pub fn affects_metrics(&self) -> bool {
        matches!(
            self,
            Self::CurrentPrice(_)
                | Self::FairValue(_)
                | Self::Beta(_)
                | Self::ProbabilityPositive(_)
                | Self::DownsideRisk(_)
        )
    }

    /// Whether base-currency value and P&L must be recomputed.
    pub fn affects_valuation(&self) -> bool {
        matches!(
            self,
            Self::CurrentPrice(_) | Self::AvgPriceLocal(_) | Self::SharesOwned(_)
        )
    }

    /// Write the value into the position. Callers validate first.
    pub fn apply(self, position: &mut Position) {
        match self {
            Self::CurrentPrice(v) => position.current_price = v,
            Self::AvgPriceLocal(v) => position.avg_price_local = v,
            Self::FairValue(v) => position.fair_value = v,
            Self::SharesOwned(v) => position.shares_owned = v,
            Self::Beta(v) => position.beta = v,
            Self::Volatility(v) => position.volatility = v,
            Self::ProbabilityPositive(v) => position.probability_positive = v,
            Self::DownsideRisk(v) => position.downside_risk = v,
            Self::PeRatio(v) => position.pe_ratio = v,
            Self::EpsGrowthRate(v) => position.eps_growth_rate = v,
            Self::DebtToEbitda(v) => position.debt_to_ebitda = v,
            Self::DividendYield(v) => position.dividend_yield = v,
            Self::Comment(v) => position.comment = v,
            Self::CompanyName(v) => position.company_name = v.trim().to_string(),
            Self::Sector(v) => position.sector = v.filter(|s| !s.trim().is_empty()),
            Self::UpdateFrequency(v) => position.update_frequency = v,
            Self::Isin(v) => position.isin = v.filter(|s| !s.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_tagged_command() {
        let update: PositionUpdate =
            serde_json::from_str(r#"{"field": "fair_value", "value": 120.5}"#).unwrap();
        assert_eq!(update, PositionUpdate::FairValue(120.5));

        let update: PositionUpdate =
            serde_json::from_str(r#"{"field": "update_frequency", "value": "weekly"}"#).unwrap();
        assert_eq!(update, PositionUpdate::UpdateFrequency(UpdateFrequency::Weekly));

        let update: PositionUpdate =
            serde_json::from_str(r#"{"field": "downside_risk", "value": null}"#).unwrap();
        assert_eq!(update, PositionUpdate::DownsideRisk(None));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result =
            serde_json::from_str::<PositionUpdate>(r#"{"field": "expected_value", "value": 50}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_bounds() {
        assert!(PositionUpdate::CurrentPrice(0.0).validate().is_ok());
        assert!(PositionUpdate::CurrentPrice(-1.0).validate().is_err());
        assert!(PositionUpdate::ProbabilityPositive(1.0).validate().is_ok());
        assert!(PositionUpdate::ProbabilityPositive(1.01).validate().is_err());
        assert!(PositionUpdate::DownsideRisk(Some(-25.0)).validate().is_ok());
        assert!(PositionUpdate::DownsideRisk(Some(5.0)).validate().is_err());
        assert!(PositionUpdate::EpsGrowthRate(-40.0).validate().is_ok());
        assert!(PositionUpdate::Beta(f64::NAN).validate().is_err());
        assert_eq!(
            PositionUpdate::CompanyName("  ".to_string()).validate(),
            Err(ValidationError::MissingField("company_name".to_string()))
        );
    }

    #[test]
    fn test_metric_relevance() {
        assert!(PositionUpdate::FairValue(10.0).affects_metrics());
        assert!(!PositionUpdate::SharesOwned(10.0).affects_metrics());
        assert!(PositionUpdate::SharesOwned(10.0).affects_valuation());
        assert!(!PositionUpdate::Comment(None).affects_metrics());
        assert!(!PositionUpdate::Comment(None).affects_valuation());
    }
}
