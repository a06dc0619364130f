//! Provider trait definitions.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{AnalysisRequest, FxRate, Fundamentals, Quote, StockAnalysis};

/// Trait for quantitative market data providers.
///
/// Implement this trait to add support for a new quote source.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use assessapp_market_data::{MarketDataError, MarketDataProvider, Quote};
///
/// struct MyProvider {
///     api_key: String,
/// }
///
/// #[async_trait]
/// impl MarketDataProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     async fn get_latest_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
///         // ...
///     }
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "ALPHA_VANTAGE".
    /// Used for logging, diagnostics and provenance.
    fn id(&self) -> &'static str;

    /// Fetch the latest quote for a symbol.
    async fn get_latest_quote(&self, symbol: &str) -> Result<Quote, MarketDataError>;

    /// Fetch fundamentals (beta, consensus target, P/E, yield, EPS growth, sector).
    ///
    /// Default implementation returns `NotSupported`.
    async fn get_fundamentals(&self, _symbol: &str) -> Result<Fundamentals, MarketDataError> {
        Err(MarketDataError::NotSupported {
            operation: "fundamentals".to_string(),
            provider: self.id().to_string(),
        })
    }
}

/// Trait for generative-analysis providers that answer with a [`StockAnalysis`].
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    fn id(&self) -> &'static str;

    /// Run one structured analysis. A response that does not match the
    /// schema must surface as [`MarketDataError::Schema`].
    async fn analyze(&self, request: &AnalysisRequest) -> Result<StockAnalysis, MarketDataError>;
}

/// Trait for currency conversion providers.
#[async_trait]
pub trait FxRateProvider: Send + Sync {
    fn id(&self) -> &'static str;

    /// Units of `to` per one unit of `from`.
    async fn get_rate(&self, from: &str, to: &str) -> Result<FxRate, MarketDataError>;
}
