//! Market data models
//!
//! - `types` - Type aliases for common identifiers (ProviderId, Currency)
//! - `quote` - Latest price quote
//! - `fundamentals` - Company overview fields used by the risk model
//! - `analysis` - Generative-analysis request and strict response schema
//! - `fx` - Currency conversion rate

mod analysis;
mod fundamentals;
mod fx;
mod quote;
mod types;

pub use analysis::{AnalysisRequest, StockAnalysis, StrategyRules};
pub use fundamentals::Fundamentals;
pub use fx::FxRate;
pub use quote::Quote;
pub use types::{Currency, ProviderId};
