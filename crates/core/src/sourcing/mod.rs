//! Data sourcing - populate a position's raw inputs from providers in priority order.

mod analysis_source;
mod market_data_source;
mod pipeline;
mod sourcing_model;
mod sourcing_traits;

pub use analysis_source::AnalysisSource;
pub use market_data_source::MarketDataSource;
pub use pipeline::DataSourcingPipeline;
pub use sourcing_model::{SourceKind, SourcedFields, SourcingOutcome};
pub use sourcing_traits::PositionSource;
