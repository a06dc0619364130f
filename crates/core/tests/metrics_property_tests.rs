//! Property-based tests for the metrics engine and portfolio aggregation.
//!
//! These tests check formula exactness and bounds across random inputs,
//! using the `proptest` crate for random test case generation.

use assessapp_core::portfolio::PortfolioAggregator;
use assessapp_core::positions::{Assessment, NewPosition, Position, UpdateFrequency};
use assessapp_core::MetricsEngine;
use proptest::prelude::*;
use std::collections::HashMap;

// =============================================================================
// Generators
// =============================================================================

fn build(
    price: f64,
    fair_value: f64,
    p: f64,
    downside: Option<f64>,
    beta: f64,
    shares: f64,
) -> Position {
    NewPosition {
        id: None,
        ticker: "PROP".to_string(),
        isin: None,
        company_name: "Property Co".to_string(),
        sector: None,
        currency: "USD".to_string(),
        update_frequency: None,
        current_price: price,
        fair_value,
        probability_positive: Some(p),
        downside_risk: downside,
        beta,
        volatility: 0.0,
        shares_owned: shares,
        avg_price_local: price,
        comment: None,
    }
    .into_position("prop".to_string(), UpdateFrequency::Daily)
}

/// Generates a position with valid raw inputs.
fn arb_position() -> impl Strategy<Value = Position> {
    (
        0.01f64..10_000.0,                         // price
        0.0f64..20_000.0,                          // fair value
        0.0f64..=1.0,                              // probability
        proptest::option::of(-90.0f64..=0.0),      // explicit downside
        0.0f64..3.0,                               // beta
    )
        .prop_map(|(price, fv, p, downside, beta)| build(price, fv, p, downside, beta, 1.0))
}

/// Generates a small portfolio of priced, active positions in mixed currencies.
fn arb_portfolio() -> impl Strategy<Value = Vec<Position>> {
    prop::collection::vec(
        (
            0.01f64..1_000.0,
            0.01f64..1_000.0,
            prop_oneof![Just("USD"), Just("EUR"), Just("GBP")],
        ),
        1..12,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (price, shares, currency))| {
                let mut p = build(price, price, 0.65, None, 1.0, shares);
                p.id = format!("p{}", i);
                p.currency = currency.to_string();
                p
            })
            .collect()
    })
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn upside_is_exact(position in arb_position()) {
        let m = MetricsEngine::default().derive(&position);
        let expected = (position.fair_value - position.current_price) / position.current_price * 100.0;
        prop_assert_eq!(m.upside_potential, expected);
    }

    #[test]
    fn kelly_follows_formula_and_half_kelly_is_bounded(position in arb_position()) {
        let m = MetricsEngine::default().derive(&position);
        let p = position.probability_positive;

        if m.b_ratio > 0.0 {
            let raw = ((m.b_ratio * p) - (1.0 - p)) / m.b_ratio * 100.0;
            prop_assert_eq!(m.kelly_fraction, raw.max(0.0));
        } else {
            prop_assert_eq!(m.kelly_fraction, 0.0);
        }
        prop_assert!(m.kelly_fraction >= 0.0);
        prop_assert_eq!(m.half_kelly_suggested, (m.kelly_fraction / 2.0).min(15.0));
        prop_assert!(m.half_kelly_suggested >= 0.0 && m.half_kelly_suggested <= 15.0);
    }

    #[test]
    fn expected_value_is_formula_of_inputs(position in arb_position()) {
        let m = MetricsEngine::default().derive(&position);
        let p = position.probability_positive;
        let expected = p * m.upside_potential + (1.0 - p) * m.effective_downside_risk;
        prop_assert_eq!(m.expected_value, expected);
    }

    #[test]
    fn buy_zone_is_ordered(position in arb_position()) {
        let m = MetricsEngine::default().derive(&position);
        prop_assert!(m.buy_zone_min <= m.buy_zone_max);
    }

    #[test]
    fn assessment_partitions_ev(ev in -1_000.0f64..1_000.0) {
        let engine = MetricsEngine::default();
        let assessment = engine.assess(ev);
        let bands = [ev > 7.0, ev > 0.0 && ev <= 7.0, ev > -5.0 && ev <= 0.0, ev <= -5.0];
        prop_assert_eq!(bands.iter().filter(|b| **b).count(), 1);
        let expected = if bands[0] {
            Assessment::Add
        } else if bands[1] {
            Assessment::Hold
        } else if bands[2] {
            Assessment::Trim
        } else {
            Assessment::Sell
        };
        prop_assert_eq!(assessment, expected);
    }

    #[test]
    fn compute_is_idempotent(position in arb_position()) {
        let engine = MetricsEngine::default();
        let once = engine.compute(&position);
        let twice = engine.compute(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn weights_sum_to_one_hundred(positions in arb_portfolio()) {
        let mut rates = HashMap::new();
        rates.insert("USD".to_string(), 1.0);
        rates.insert("EUR".to_string(), 1.1);
        rates.insert("GBP".to_string(), 1.27);

        let metrics = PortfolioAggregator.aggregate(&positions, &rates);
        let total: f64 = metrics.position_weights.iter().map(|w| w.weight).sum();

        prop_assert!(metrics.total_value > 0.0);
        prop_assert!((total - 100.0).abs() < 1e-6);
        let sectors: f64 = metrics.sector_weights.values().sum();
        prop_assert!((sectors - 100.0).abs() < 1e-6);
    }
}

// =============================================================================
// Worked scenarios
// =============================================================================

#[test]
fn scenario_undervalued_hold() {
    let m = MetricsEngine::default().derive(&build(100.0, 120.0, 0.65, Some(-20.0), 1.0, 1.0));
    assert!((m.upside_potential - 20.0).abs() < 1e-9);
    assert!((m.expected_value - 6.0).abs() < 1e-9);
    assert_eq!(m.assessment, Assessment::Hold);
}

#[test]
fn scenario_fairly_priced_sell() {
    let m = MetricsEngine::default().derive(&build(50.0, 50.0, 0.65, Some(-15.0), 1.0, 1.0));
    assert_eq!(m.upside_potential, 0.0);
    assert!((m.expected_value + 5.25).abs() < 1e-9);
    assert_eq!(m.assessment, Assessment::Sell);
}

#[test]
fn scenario_high_beta_calibration() {
    let m = MetricsEngine::default().derive(&build(100.0, 120.0, 0.65, None, 1.8, 1.0));
    assert_eq!(m.effective_downside_risk, -30.0);
}

#[test]
fn scenario_empty_portfolio() {
    let metrics = PortfolioAggregator.aggregate(&[], &HashMap::new());
    assert_eq!(metrics.total_value, 0.0);
    assert_eq!(metrics.weighted_ev, 0.0);
    assert_eq!(metrics.risk_adjusted_return, 0.0);
    assert!(metrics.position_weights.is_empty());
}
