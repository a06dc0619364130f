use assessapp_market_data::{MarketDataError, MarketDataProvider, RetryPolicy};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use std::sync::Arc;

use super::sourcing_model::{SourceKind, SourcedFields};
use super::sourcing_traits::PositionSource;
use crate::positions::Position;

/// Quote plus fundamentals from a quantitative provider.
///
/// The quote is required. Fundamentals are merged when available; their
/// failure alone never fails the source.
pub struct MarketDataSource {
    provider: Arc<dyn MarketDataProvider>,
    retry: RetryPolicy,
}

impl MarketDataSource {
    pub fn new(provider: Arc<dyn MarketDataProvider>, retry: RetryPolicy) -> Self {
        Self { provider, retry }
    }
}

#[async_trait]
impl PositionSource for MarketDataSource {
    fn kind(&self) -> SourceKind {
        SourceKind::MarketData
    }

    fn id(&self) -> &'static str {
        self.provider.id()
    }

    async fn fetch(&self, position: &Position) -> Result<SourcedFields, MarketDataError> {
        let provider = self.provider.as_ref();
        let symbol = position.ticker.as_str();

        let quote = self
            .retry
            .run(provider.id(), || provider.get_latest_quote(symbol))
            .await?;

        let mut fields = SourcedFields {
            current_price: Some(quote.price),
            currency: quote.currency.clone(),
            data_source: provider.id().to_string(),
            quote_fetched_at: Some(Utc::now()),
            ..SourcedFields::default()
        };
        if !quote.is_usable() {
            return Ok(fields);
        }

        match self
            .retry
            .run(provider.id(), || provider.get_fundamentals(symbol))
            .await
        {
            Ok(fundamentals) => {
                let target = fundamentals
                    .target_price
                    .filter(|t| t.is_finite() && *t > 0.0);
                if target.is_some() {
                    fields.fair_value_source = Some(format!(
                        "{} consensus target, {}",
                        provider.id(),
                        fundamentals.fetched_at.format("%Y-%m-%d")
                    ));
                }
                fields.fair_value = target;
                fields.company_name = fundamentals.name;
                fields.sector = fundamentals.sector;
                fields.beta = fundamentals.beta.filter(|b| b.is_finite() && *b >= 0.0);
                fields.pe_ratio = fundamentals.pe_ratio.filter(|v| v.is_finite() && *v >= 0.0);
                fields.dividend_yield = fundamentals
                    .dividend_yield
                    .filter(|v| v.is_finite() && *v >= 0.0);
                fields.eps_growth_rate = fundamentals.eps_growth_rate.filter(|v| v.is_finite());
                fields.fundamentals_fetched_at = Some(Utc::now());
            }
            Err(MarketDataError::NotSupported { .. }) => {
                debug!("{} does not provide fundamentals", provider.id());
            }
            Err(e) => {
                warn!(
                    "{} fundamentals for {} unavailable, keeping previous values: {}",
                    provider.id(),
                    symbol,
                    e
                );
            }
        }

        Ok(fields)
    }
}
