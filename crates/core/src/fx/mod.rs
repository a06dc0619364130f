//! FX (Foreign Exchange) module - rates to the base currency, cache and resolution.

mod fx_model;
mod fx_service;
mod fx_traits;
mod rate_cache;

pub use fx_model::ExchangeRate;
pub use fx_service::FxService;
pub use fx_traits::{FxRepositoryTrait, FxServiceTrait};
pub use rate_cache::{RateCache, RateCacheConfig};
