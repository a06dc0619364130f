use assessapp_market_data::{FxRateProvider, RetryPolicy};
use async_trait::async_trait;
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;

use super::fx_model::ExchangeRate;
use super::fx_traits::{FxRepositoryTrait, FxServiceTrait};
use super::rate_cache::RateCache;
use crate::errors::{Result, ValidationError};

pub struct FxService {
    repository: Arc<dyn FxRepositoryTrait>,
    cache: Arc<RateCache>,
    provider: Option<Arc<dyn FxRateProvider>>,
    base_currency: String,
    retry: RetryPolicy,
}

impl FxService {
    pub fn new(
        repository: Arc<dyn FxRepositoryTrait>,
        cache: Arc<RateCache>,
        base_currency: &str,
    ) -> Self {
        Self {
            repository,
            cache,
            provider: None,
            base_currency: base_currency.to_uppercase(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn FxRateProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn cache(&self) -> &Arc<RateCache> {
        &self.cache
    }

    async fn fetch_from_provider(&self, currency: &str) -> Option<f64> {
        let provider = self.provider.as_ref()?;
        let base = self.base_currency.as_str();
        let result = self
            .retry
            .run(provider.id(), || provider.get_rate(currency, base))
            .await;

        match result {
            Ok(fx) if fx.rate.is_finite() && fx.rate > 0.0 => {
                self.cache.put(currency, fx.rate);
                let stored = ExchangeRate {
                    currency_code: currency.to_string(),
                    rate: fx.rate,
                    is_manual: false,
                    source: fx.source.to_string(),
                    updated_at: fx.timestamp,
                };
                if let Err(e) = self.repository.upsert_rate(stored).await {
                    warn!("Failed to persist {} rate for {}: {}", provider.id(), currency, e);
                }
                Some(fx.rate)
            }
            Ok(fx) => {
                warn!(
                    "{} returned unusable rate {} for {}/{}",
                    provider.id(),
                    fx.rate,
                    currency,
                    base
                );
                None
            }
            Err(e) => {
                warn!("{} failed for {}/{}: {}", provider.id(), currency, base, e);
                None
            }
        }
    }
}

#[async_trait]
impl FxServiceTrait for FxService {
    fn base_currency(&self) -> &str {
        &self.base_currency
    }

    async fn rate_to_base(&self, currency: &str) -> f64 {
        let currency = currency.trim().to_uppercase();
        if currency.is_empty() || currency == self.base_currency {
            return 1.0;
        }

        let stored = match self.repository.get_rate(&currency) {
            Ok(stored) => stored.filter(ExchangeRate::is_usable),
            Err(e) => {
                warn!("Failed to load stored rate for {}: {}", currency, e);
                None
            }
        };

        if let Some(rate) = stored.as_ref().filter(|r| r.is_manual) {
            debug!("Using manual rate {} for {}", rate.rate, currency);
            return rate.rate;
        }

        if let Some(rate) = self.cache.get(&currency) {
            return rate;
        }

        if let Some(rate) = self.fetch_from_provider(&currency).await {
            return rate;
        }

        if let Some(rate) = stored {
            debug!(
                "Using stored {} rate {} for {} from {}",
                rate.source, rate.rate, currency, rate.updated_at
            );
            return rate.rate;
        }

        warn!(
            "No exchange rate known for {} -> {}, using 1.0",
            currency, self.base_currency
        );
        1.0
    }

    async fn rates_for(&self, currencies: &[String]) -> HashMap<String, f64> {
        let mut rates = HashMap::new();
        for currency in currencies {
            let code = currency.trim().to_uppercase();
            if rates.contains_key(&code) {
                continue;
            }
            let rate = self.rate_to_base(&code).await;
            rates.insert(code, rate);
        }
        rates
    }

    async fn set_manual_rate(&self, currency: &str, rate: f64) -> Result<ExchangeRate> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(ValidationError::OutOfRange {
                field: "rate",
                value: rate,
                expected: "> 0",
            }
            .into());
        }
        let manual = ExchangeRate::manual(currency.trim(), rate);
        let saved = self.repository.upsert_rate(manual).await?;
        self.cache.invalidate(&saved.currency_code);
        Ok(saved)
    }

    fn list_rates(&self) -> Result<Vec<ExchangeRate>> {
        self.repository.list_rates()
    }
}
