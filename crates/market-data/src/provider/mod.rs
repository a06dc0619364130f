//! Provider abstractions and implementations.
//!
//! This module contains:
//! - The `MarketDataProvider` trait for quantitative quote/fundamentals sources
//! - The `AnalysisProvider` trait for generative-analysis sources
//! - The `FxRateProvider` trait for currency conversion sources
//! - Concrete implementations (Alpha Vantage, xAI, exchangeratesapi.io)

mod http;
mod traits;

pub mod alpha_vantage;
pub mod exchange_rates_api;
pub mod xai;

pub use traits::{AnalysisProvider, FxRateProvider, MarketDataProvider};
