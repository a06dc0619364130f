//! Assessapp Market Data Crate
//!
//! Provider-agnostic access to the external data a position refresh needs:
//! - Quantitative quotes and fundamentals (Alpha Vantage)
//! - Generative analysis against a strict JSON schema (xAI chat completions)
//! - Currency conversion rates (exchangeratesapi.io)
//!
//! # Architecture
//!
//! ```text
//! +-------------------+   +-------------------+   +-------------------+
//! | MarketDataProvider|   | AnalysisProvider  |   |  FxRateProvider   |
//! +-------------------+   +-------------------+   +-------------------+
//!           \                      |                      /
//!            \                     v                     /
//!             +--------->   RetryPolicy::run   <--------+
//!                                  |
//!                                  v
//!                          MarketDataError  (classified by RetryClass)
//! ```
//!
//! Every call returns a [`MarketDataError`] on failure. The error's
//! [`RetryClass`](errors::RetryClass) decides whether [`RetryPolicy`]
//! tries the same provider again.

pub mod diagnostics;
pub mod errors;
pub mod models;
pub mod provider;
pub mod retry;

pub use diagnostics::{AttemptOutcome, FetchDiagnostics, ProviderAttempt, SkipReason};
pub use errors::{MarketDataError, RetryClass};
pub use models::{
    AnalysisRequest, Currency, FxRate, Fundamentals, ProviderId, Quote, StockAnalysis,
    StrategyRules,
};
pub use provider::alpha_vantage::AlphaVantageProvider;
pub use provider::exchange_rates_api::ExchangeRatesApiProvider;
pub use provider::xai::XaiProvider;
pub use provider::{AnalysisProvider, FxRateProvider, MarketDataProvider};
pub use retry::RetryPolicy;
