use assessapp_market_data::StrategyRules;
use std::fmt;

use crate::constants::{
    ADD_THRESHOLD, BUY_ZONE_FALLBACK_MAX, BUY_ZONE_FALLBACK_MIN, BUY_ZONE_WIDTH,
    DEFAULT_PROBABILITY_POSITIVE, DEFAULT_SELL_THRESHOLD, DEFAULT_TARGET_EV, HALF_KELLY_CAP,
    SUPPLIED_EV_TOLERANCE, UPSIDE_WARNING_PERCENT,
};
use crate::errors::{Error, Result};
use crate::positions::{Assessment, DerivedMetrics, Position};

/// Boundaries of the EV strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    /// EV strictly above this is Add
    pub add_threshold: f64,
    /// EV at or below this is Sell, between this and 0 is Trim
    pub sell_threshold: f64,
    /// EV the buy zone is derived for
    pub target_ev: f64,
    pub half_kelly_cap: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            add_threshold: ADD_THRESHOLD,
            sell_threshold: DEFAULT_SELL_THRESHOLD,
            target_ev: DEFAULT_TARGET_EV,
            half_kelly_cap: HALF_KELLY_CAP,
        }
    }
}

impl MetricsConfig {
    pub fn validate(&self) -> Result<()> {
        let finite = [
            self.add_threshold,
            self.sell_threshold,
            self.target_ev,
            self.half_kelly_cap,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(Error::InvalidConfigValue(
                "metrics thresholds must be finite".to_string(),
            ));
        }
        if !(self.sell_threshold < 0.0 && self.add_threshold > 0.0) {
            return Err(Error::InvalidConfigValue(format!(
                "EV bands must satisfy sell ({}) < 0 < add ({})",
                self.sell_threshold, self.add_threshold
            )));
        }
        if !(0.0..=HALF_KELLY_CAP).contains(&self.half_kelly_cap) {
            return Err(Error::InvalidConfigValue(format!(
                "half-Kelly cap must be within [0, {}], got {}",
                HALF_KELLY_CAP, self.half_kelly_cap
            )));
        }
        Ok(())
    }

    /// Rules handed to generative providers so their derived fields follow the same bands.
    pub fn strategy_rules(&self) -> StrategyRules {
        StrategyRules {
            add_threshold: self.add_threshold,
            sell_threshold: self.sell_threshold,
            target_ev: self.target_ev,
            half_kelly_cap: self.half_kelly_cap,
            default_probability: DEFAULT_PROBABILITY_POSITIVE,
        }
    }
}

/// Computed values outside sane bounds. Logged, never blocking.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricWarning {
    ExcessiveUpside { upside: f64 },
    DownsideBeyondTotalLoss { downside: f64 },
    MissingFairValue,
}

impl fmt::Display for MetricWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricWarning::ExcessiveUpside { upside } => {
                write!(f, "upside of {:.1}% exceeds {}%", upside, UPSIDE_WARNING_PERCENT)
            }
            MetricWarning::DownsideBeyondTotalLoss { downside } => {
                write!(f, "downside of {:.1}% is below -100%", downside)
            }
            MetricWarning::MissingFairValue => write!(f, "fair value is missing"),
        }
    }
}

/// Downside in percent implied by market sensitivity.
pub fn calibrate_downside(beta: f64) -> f64 {
    if beta < 0.5 {
        -15.0
    } else if beta < 1.0 {
        -20.0
    } else if beta < 1.5 {
        -25.0
    } else {
        -30.0
    }
}

/// Deterministic derivation of a position's metrics from its raw inputs.
#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    config: MetricsConfig,
}

impl MetricsEngine {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Returns a copy of `position` with freshly derived metrics.
    pub fn compute(&self, position: &Position) -> Position {
        let mut computed = position.clone();
        computed.metrics = self.derive(position);
        computed
    }

    /// Map EV onto the assessment bands. Total over all floats, NaN is Sell.
    pub fn assess(&self, expected_value: f64) -> Assessment {
        if expected_value > self.config.add_threshold {
            Assessment::Add
        } else if expected_value > 0.0 {
            Assessment::Hold
        } else if expected_value > self.config.sell_threshold {
            Assessment::Trim
        } else {
            Assessment::Sell
        }
    }

    /// Derive metrics. Invalid inputs give neutral (zeroed) metrics.
    pub fn derive(&self, position: &Position) -> DerivedMetrics {
        if !Self::inputs_valid(position) {
            return self.neutral();
        }

        let p = position.probability_positive;
        let price = position.current_price;
        let fair_value = position.fair_value;

        let upside_potential = if price > 0.0 {
            (fair_value - price) / price * 100.0
        } else {
            0.0
        };
        let downside = position
            .downside_risk
            .unwrap_or_else(|| calibrate_downside(position.beta));

        let b_ratio = if downside == 0.0 {
            0.0
        } else {
            upside_potential / downside.abs()
        };

        let expected_value = p * upside_potential + (1.0 - p) * downside;

        let kelly_fraction = if b_ratio > 0.0 {
            (((b_ratio * p) - (1.0 - p)) / b_ratio * 100.0).max(0.0)
        } else {
            0.0
        };
        let half_kelly_suggested = (kelly_fraction / 2.0).min(self.config.half_kelly_cap);

        let (buy_zone_min, buy_zone_max) = self.buy_zone(price, fair_value, p, downside);

        let metrics = DerivedMetrics {
            upside_potential,
            effective_downside_risk: downside,
            b_ratio,
            expected_value,
            kelly_fraction,
            half_kelly_suggested,
            buy_zone_min,
            buy_zone_max,
            assessment: self.assess(expected_value),
        };

        if Self::all_finite(&metrics) {
            metrics
        } else {
            self.neutral()
        }
    }

    /// Sanity warnings for a computed position.
    pub fn validate(&self, position: &Position) -> Vec<MetricWarning> {
        let mut warnings = Vec::new();
        let m = &position.metrics;
        if m.upside_potential > UPSIDE_WARNING_PERCENT {
            warnings.push(MetricWarning::ExcessiveUpside {
                upside: m.upside_potential,
            });
        }
        if m.effective_downside_risk < -100.0 {
            warnings.push(MetricWarning::DownsideBeyondTotalLoss {
                downside: m.effective_downside_risk,
            });
        }
        if position.current_price > 0.0 && position.fair_value <= 0.0 {
            warnings.push(MetricWarning::MissingFairValue);
        }
        warnings
    }

    /// Reasons why metrics supplied by a provider cannot be adopted as-is.
    /// Empty when they satisfy every invariant of the local model.
    pub fn supplied_metrics_issues(&self, position: &Position) -> Vec<String> {
        let m = &position.metrics;
        let mut issues = Vec::new();

        if !Self::all_finite(m) {
            issues.push("non-finite value".to_string());
            return issues;
        }
        if m.half_kelly_suggested < 0.0 || m.half_kelly_suggested > self.config.half_kelly_cap {
            issues.push(format!(
                "half-Kelly {} outside [0, {}]",
                m.half_kelly_suggested, self.config.half_kelly_cap
            ));
        }
        if m.kelly_fraction < 0.0 {
            issues.push(format!("negative Kelly fraction {}", m.kelly_fraction));
        }
        if m.buy_zone_min > m.buy_zone_max {
            issues.push(format!(
                "buy zone min {} above max {}",
                m.buy_zone_min, m.buy_zone_max
            ));
        }
        if m.effective_downside_risk > 0.0 {
            issues.push(format!("positive downside {}", m.effective_downside_risk));
        }

        let p = position.probability_positive;
        if !(0.0..=1.0).contains(&p) {
            issues.push(format!("probability {} outside [0, 1]", p));
        }
        let formula_ev = p * m.upside_potential + (1.0 - p) * m.effective_downside_risk;
        if (formula_ev - m.expected_value).abs() > SUPPLIED_EV_TOLERANCE {
            issues.push(format!(
                "EV {} does not match formula value {:.2}",
                m.expected_value, formula_ev
            ));
        }

        if position.current_price > 0.0 {
            let upside = (position.fair_value - position.current_price) / position.current_price
                * 100.0;
            if (upside - m.upside_potential).abs() > SUPPLIED_EV_TOLERANCE {
                issues.push(format!(
                    "upside {} does not match prices ({:.2})",
                    m.upside_potential, upside
                ));
            }
        }

        let expected = self.assess(m.expected_value);
        if m.assessment != expected {
            issues.push(format!(
                "assessment {} inconsistent with EV {} (expected {})",
                m.assessment, m.expected_value, expected
            ));
        }

        issues
    }

    fn neutral(&self) -> DerivedMetrics {
        DerivedMetrics {
            assessment: self.assess(0.0),
            ..DerivedMetrics::default()
        }
    }

    fn buy_zone(&self, price: f64, fair_value: f64, p: f64, downside: f64) -> (f64, f64) {
        if fair_value > 0.0 && p > 0.0 {
            let required_upside = (self.config.target_ev - (1.0 - p) * downside) / p;
            if required_upside.is_finite() && required_upside > 0.0 {
                let max = fair_value / (1.0 + required_upside / 100.0);
                return (max * BUY_ZONE_WIDTH, max);
            }
        }

        let reference = if price > 0.0 { price } else { fair_value };
        if reference > 0.0 {
            (
                reference * BUY_ZONE_FALLBACK_MIN,
                reference * BUY_ZONE_FALLBACK_MAX,
            )
        } else {
            (0.0, 0.0)
        }
    }

    fn inputs_valid(position: &Position) -> bool {
        let p = position.probability_positive;
        let finite = [position.current_price, position.fair_value, p, position.beta]
            .iter()
            .all(|v| v.is_finite());
        let downside_ok = match position.downside_risk {
            Some(d) => d.is_finite() && d <= 0.0,
            None => true,
        };
        finite
            && downside_ok
            && (0.0..=1.0).contains(&p)
            && position.current_price >= 0.0
            && position.fair_value >= 0.0
    }

    fn all_finite(m: &DerivedMetrics) -> bool {
        [
            m.upside_potential,
            m.effective_downside_risk,
            m.b_ratio,
            m.expected_value,
            m.kelly_fraction,
            m.half_kelly_suggested,
            m.buy_zone_min,
            m.buy_zone_max,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}
