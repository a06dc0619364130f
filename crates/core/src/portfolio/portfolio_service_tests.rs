use super::*;
use crate::errors::Result;
use crate::fx::{ExchangeRate, FxServiceTrait};
use crate::positions::{NewPosition, Position, PositionRepositoryTrait, UpdateFrequency};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

fn position(id: &str, currency: &str, shares: f64, price: f64, ev: f64, sector: Option<&str>) -> Position {
    let mut position = NewPosition {
        id: None,
        ticker: id.to_uppercase(),
        isin: None,
        company_name: id.to_string(),
        sector: sector.map(str::to_string),
        currency: currency.to_string(),
        update_frequency: None,
        current_price: price,
        fair_value: price,
        probability_positive: None,
        downside_risk: None,
        beta: 1.0,
        volatility: 20.0,
        shares_owned: shares,
        avg_price_local: price,
        comment: None,
    }
    .into_position(id.to_string(), UpdateFrequency::Daily);
    position.metrics.expected_value = ev;
    position
}

fn rates() -> HashMap<String, f64> {
    let mut rates = HashMap::new();
    rates.insert("USD".to_string(), 1.0);
    rates.insert("EUR".to_string(), 2.0);
    rates
}

#[test]
fn test_empty_portfolio_is_all_zero() {
    let metrics = PortfolioAggregator.aggregate(&[], &rates());
    assert_eq!(metrics, PortfolioMetrics::default());
}

#[test]
fn test_weights_follow_base_values() {
    let positions = vec![
        position("a", "USD", 10.0, 100.0, 10.0, Some("Tech")),
        position("b", "EUR", 5.0, 100.0, -2.0, Some("Energy")),
    ];

    let metrics = PortfolioAggregator.aggregate(&positions, &rates());

    assert_eq!(metrics.total_value, 2000.0);
    assert_eq!(metrics.position_weights[0].weight, 50.0);
    assert_eq!(metrics.position_weights[1].weight, 50.0);
    assert!((metrics.weighted_ev - 4.0).abs() < 1e-9);
    assert!((metrics.weighted_volatility - 20.0).abs() < 1e-9);
    assert!((metrics.risk_adjusted_return - 0.2).abs() < 1e-9);
    assert!((metrics.kelly_utilization - 100.0).abs() < 1e-9);
    assert_eq!(metrics.sector_weights["Tech"], 50.0);
}

#[test]
fn test_inactive_positions_are_ignored() {
    let mut inactive = position("b", "USD", 10.0, 100.0, 50.0, None);
    inactive.is_active = false;
    let positions = vec![position("a", "USD", 1.0, 100.0, 5.0, None), inactive];

    let metrics = PortfolioAggregator.aggregate(&positions, &rates());

    assert_eq!(metrics.total_value, 100.0);
    assert_eq!(metrics.position_weights.len(), 1);
    assert_eq!(metrics.weighted_ev, 5.0);
}

#[test]
fn test_missing_sector_and_rate_defaults() {
    let positions = vec![position("a", "JPY", 2.0, 50.0, 3.0, Some("  "))];

    let metrics = PortfolioAggregator.aggregate(&positions, &rates());

    assert_eq!(metrics.total_value, 100.0);
    assert_eq!(metrics.sector_weights["Unknown"], 100.0);
}

#[test]
fn test_zero_volatility_gives_zero_risk_adjusted_return() {
    let mut p = position("a", "USD", 1.0, 100.0, 5.0, None);
    p.volatility = 0.0;
    let metrics = PortfolioAggregator.aggregate(&[p], &rates());
    assert_eq!(metrics.risk_adjusted_return, 0.0);
}

#[test]
fn test_all_unpriced_positions_have_zero_weight() {
    let positions = vec![
        position("a", "USD", 10.0, 0.0, 0.0, None),
        position("b", "USD", 0.0, 100.0, 0.0, None),
    ];
    let metrics = PortfolioAggregator.aggregate(&positions, &rates());
    assert_eq!(metrics.total_value, 0.0);
    assert!(metrics.position_weights.iter().all(|w| w.weight == 0.0));
    assert_eq!(metrics.kelly_utilization, 0.0);
}

#[derive(Default)]
struct MockPositionRepository {
    positions: Vec<Position>,
    stored_weights: Mutex<Vec<(String, f64)>>,
}

#[async_trait]
impl PositionRepositoryTrait for MockPositionRepository {
    fn get_by_id(&self, _position_id: &str) -> Result<Position> {
        unimplemented!()
    }

    fn list(&self, is_active_filter: Option<bool>) -> Result<Vec<Position>> {
        Ok(self
            .positions
            .iter()
            .filter(|p| is_active_filter.map_or(true, |a| p.is_active == a))
            .cloned()
            .collect())
    }

    fn list_by_frequency(&self, _frequency: UpdateFrequency) -> Result<Vec<Position>> {
        unimplemented!()
    }

    async fn create(&self, _position: Position) -> Result<Position> {
        unimplemented!()
    }

    async fn update(&self, _position: Position) -> Result<Position> {
        unimplemented!()
    }

    async fn update_weights(&self, weights: Vec<(String, f64)>) -> Result<usize> {
        let count = weights.len();
        *self.stored_weights.lock().unwrap() = weights;
        Ok(count)
    }

    async fn delete(&self, _position_id: &str) -> Result<usize> {
        unimplemented!()
    }
}

struct FixedFx;

#[async_trait]
impl FxServiceTrait for FixedFx {
    fn base_currency(&self) -> &str {
        "USD"
    }

    async fn rate_to_base(&self, currency: &str) -> f64 {
        rates().get(currency).copied().unwrap_or(1.0)
    }

    async fn rates_for(&self, currencies: &[String]) -> HashMap<String, f64> {
        let mut out = HashMap::new();
        for currency in currencies {
            out.insert(currency.clone(), self.rate_to_base(currency).await);
        }
        out
    }

    async fn set_manual_rate(&self, currency: &str, rate: f64) -> Result<ExchangeRate> {
        Ok(ExchangeRate::manual(currency, rate))
    }

    fn list_rates(&self) -> Result<Vec<ExchangeRate>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_summary_persists_weights() {
    let repo = Arc::new(MockPositionRepository {
        positions: vec![
            position("a", "USD", 30.0, 100.0, 10.0, None),
            position("b", "EUR", 5.0, 100.0, 0.0, None),
        ],
        ..MockPositionRepository::default()
    });
    let service = PortfolioService::new(repo.clone(), Arc::new(FixedFx));

    let metrics = service.summary().await.unwrap();

    assert_eq!(metrics.total_value, 4000.0);
    let stored = repo.stored_weights.lock().unwrap().clone();
    assert_eq!(
        stored,
        vec![("a".to_string(), 75.0), ("b".to_string(), 25.0)]
    );
}
