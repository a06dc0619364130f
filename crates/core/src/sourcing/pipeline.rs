use assessapp_market_data::{FetchDiagnostics, SkipReason};
use log::{debug, info, warn};
use std::borrow::Cow;
use std::sync::Arc;

use super::sourcing_model::SourcingOutcome;
use super::sourcing_traits::PositionSource;
use crate::errors::SourcingError;
use crate::fx::RateCache;
use crate::positions::Position;

/// Ordered chain of sources for a single position refresh.
///
/// The first source that answers with a usable price wins. When every source
/// fails the position is put into the explicit Unavailable state: no value
/// is ever invented. The pipeline does not persist anything; the only side
/// effect is caching FX rates emitted by an analysis.
pub struct DataSourcingPipeline {
    sources: Vec<Arc<dyn PositionSource>>,
    rate_cache: Arc<RateCache>,
    base_currency: String,
}

impl DataSourcingPipeline {
    pub fn new(
        sources: Vec<Arc<dyn PositionSource>>,
        rate_cache: Arc<RateCache>,
        base_currency: &str,
    ) -> Self {
        Self {
            sources,
            rate_cache,
            base_currency: base_currency.to_uppercase(),
        }
    }

    pub fn source_ids(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.id()).collect()
    }

    /// Sources in the order they will be tried. A preferred source, matched by
    /// id or kind, goes first; the rest keep their configured order.
    fn ordered(&self, preferred: Option<&str>) -> Vec<&Arc<dyn PositionSource>> {
        let mut ordered: Vec<&Arc<dyn PositionSource>> = self.sources.iter().collect();
        if let Some(preferred) = preferred.map(str::trim).filter(|p| !p.is_empty()) {
            let matches = |s: &&Arc<dyn PositionSource>| {
                s.id().eq_ignore_ascii_case(preferred)
                    || s.kind().as_str().eq_ignore_ascii_case(preferred)
            };
            if let Some(index) = ordered.iter().position(matches) {
                let first = ordered.remove(index);
                ordered.insert(0, first);
            } else {
                debug!("Preferred source '{}' is not configured", preferred);
            }
        }
        ordered
    }

    pub async fn refresh(&self, position: &Position, preferred: Option<&str>) -> SourcingOutcome {
        let mut diagnostics = FetchDiagnostics::new();

        for source in self.ordered(preferred) {
            let provider_id: Cow<'static, str> = Cow::Borrowed(source.id());
            let fields = match source.fetch(position).await {
                Ok(fields) => fields,
                Err(e) => {
                    warn!("{} failed for {}: {}", source.id(), position.ticker, e);
                    diagnostics.record_error(provider_id, e.to_string());
                    continue;
                }
            };

            if fields.usable_price().is_none() {
                debug!(
                    "{} returned no usable price for {}",
                    source.id(),
                    position.ticker
                );
                diagnostics.record_skip(provider_id, SkipReason::NoUsablePrice);
                continue;
            }

            let derived_supplied = fields.derived.is_some();
            let fx_rate = fields.fx_rate_to_base;
            let mut sourced = position.clone();
            fields.apply_to(&mut sourced);

            if let Some(rate) = fx_rate {
                if !sourced.currency.eq_ignore_ascii_case(&self.base_currency) {
                    debug!(
                        "Caching {} rate {} for {} from {}",
                        self.base_currency,
                        rate,
                        sourced.currency,
                        source.id()
                    );
                    self.rate_cache.put(&sourced.currency, rate);
                }
            }

            diagnostics.record_success(provider_id);
            debug!("Sourcing {}: {}", position.ticker, diagnostics.summary());
            return SourcingOutcome {
                position: sourced,
                derived_supplied,
                diagnostics,
                error: None,
            };
        }

        let attempts = diagnostics.summary();
        info!(
            "No usable data for {}, marking unavailable ({})",
            position.ticker, attempts
        );
        let error = SourcingError::Unavailable {
            ticker: position.ticker.clone(),
            attempts,
        };
        let mut unavailable = position.clone();
        unavailable.mark_unavailable(&error.to_string());

        SourcingOutcome {
            position: unavailable,
            derived_supplied: false,
            diagnostics,
            error: Some(error),
        }
    }
}
