//! Portfolio aggregation - value, weights and weighted metrics over active positions.

mod portfolio_model;
mod portfolio_service;

pub use portfolio_model::{PortfolioMetrics, PositionWeight};
pub use portfolio_service::{PortfolioAggregator, PortfolioService, PortfolioServiceTrait};

#[cfg(test)]
mod portfolio_service_tests;
