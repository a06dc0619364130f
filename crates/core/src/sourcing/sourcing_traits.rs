use assessapp_market_data::MarketDataError;
use async_trait::async_trait;

use super::sourcing_model::{SourceKind, SourcedFields};
use crate::positions::Position;

/// One link of the sourcing chain.
#[async_trait]
pub trait PositionSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Provider identifier recorded as `data_source`.
    fn id(&self) -> &'static str;

    /// Fetch whatever this source knows about the position. Retries are the
    /// source's responsibility; an `Err` means it is exhausted.
    async fn fetch(&self, position: &Position) -> Result<SourcedFields, MarketDataError>;
}
