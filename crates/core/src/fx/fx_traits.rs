use async_trait::async_trait;
use std::collections::HashMap;

use super::fx_model::ExchangeRate;
use crate::errors::Result;

/// Trait defining the contract for FX repository operations.
#[async_trait]
pub trait FxRepositoryTrait: Send + Sync {
    fn get_rate(&self, currency_code: &str) -> Result<Option<ExchangeRate>>;
    fn list_rates(&self) -> Result<Vec<ExchangeRate>>;
    async fn upsert_rate(&self, rate: ExchangeRate) -> Result<ExchangeRate>;
}

/// Trait defining the contract for FX service operations.
#[async_trait]
pub trait FxServiceTrait: Send + Sync {
    fn base_currency(&self) -> &str;

    /// Rate converting one unit of `currency` into the base currency.
    /// Never fails: falls back to 1.0 when nothing is known.
    async fn rate_to_base(&self, currency: &str) -> f64;

    async fn rates_for(&self, currencies: &[String]) -> HashMap<String, f64>;

    async fn set_manual_rate(&self, currency: &str, rate: f64) -> Result<ExchangeRate>;

    fn list_rates(&self) -> Result<Vec<ExchangeRate>>;
}
