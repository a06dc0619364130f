//! exchangeratesapi.io FX provider.
//!
//! Uses the `latest` endpoint with an explicit base and a single target symbol.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::models::FxRate;
use crate::provider::http::{build_client, redact, send_text};
use crate::provider::FxRateProvider;

const DEFAULT_BASE_URL: &str = "https://api.exchangeratesapi.io/v1";
pub const PROVIDER_ID: &str = "EXCHANGE_RATES_API";

pub struct ExchangeRatesApiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(default)]
    success: Option<bool>,
    timestamp: Option<i64>,
    #[serde(default)]
    rates: HashMap<String, f64>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<i64>,
    #[serde(rename = "type")]
    kind: Option<String>,
    info: Option<String>,
}

impl ExchangeRatesApiProvider {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn rate_from_response(
        from: &str,
        to: &str,
        text: &str,
    ) -> Result<FxRate, MarketDataError> {
        let response: LatestResponse =
            serde_json::from_str(text).map_err(|e| MarketDataError::Schema {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse latest rates response: {}", e),
            })?;

        if response.success == Some(false) || response.error.is_some() {
            let error = response.error.unwrap_or(ApiError {
                code: None,
                kind: None,
                info: None,
            });
            // 104: monthly quota reached, 106: too many requests
            if matches!(error.code, Some(104) | Some(106)) {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: error
                    .info
                    .or(error.kind)
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        let rate = response
            .rates
            .get(to)
            .copied()
            .filter(|r| r.is_finite() && *r > 0.0)
            .ok_or_else(|| MarketDataError::NoData {
                provider: PROVIDER_ID.to_string(),
                symbol: format!("{}/{}", from, to),
            })?;

        let timestamp = response
            .timestamp
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or_else(Utc::now);

        Ok(FxRate {
            from: from.to_string(),
            to: to.to_string(),
            rate,
            timestamp,
            source: PROVIDER_ID.to_string(),
        })
    }
}

#[async_trait]
impl FxRateProvider for ExchangeRatesApiProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_rate(&self, from: &str, to: &str) -> Result<FxRate, MarketDataError> {
        let endpoint = format!("{}/latest", self.base_url);
        let params = [
            ("access_key", self.api_key.as_str()),
            ("base", from),
            ("symbols", to),
        ];
        let url = reqwest::Url::parse_with_params(&endpoint, &params).map_err(|e| {
            MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to build URL: {}", e),
            }
        })?;

        debug!("FX request: {}", redact(url.as_str(), &self.api_key));

        let text = send_text(PROVIDER_ID, self.client.get(url)).await?;
        Self::rate_from_response(from, to, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_response() {
        let json = r#"{
            "success": true,
            "timestamp": 1704412800,
            "base": "DKK",
            "date": "2024-01-05",
            "rates": { "USD": 0.1462 }
        }"#;
        let rate = ExchangeRatesApiProvider::rate_from_response("DKK", "USD", json).unwrap();
        assert_eq!(rate.rate, 0.1462);
        assert_eq!(rate.from, "DKK");
        assert_eq!(rate.timestamp.timestamp(), 1704412800);
    }

    #[test]
    fn test_missing_symbol_is_no_data() {
        let json = r#"{ "success": true, "rates": {} }"#;
        let err = ExchangeRatesApiProvider::rate_from_response("DKK", "USD", json).unwrap_err();
        assert!(matches!(err, MarketDataError::NoData { .. }));
    }

    #[test]
    fn test_api_error_mapping() {
        let json = r#"{ "success": false, "error": { "code": 106, "type": "rate_limit_reached" } }"#;
        let err = ExchangeRatesApiProvider::rate_from_response("DKK", "USD", json).unwrap_err();
        assert!(matches!(err, MarketDataError::RateLimited { .. }));

        let json = r#"{ "success": false, "error": { "code": 101, "type": "invalid_access_key", "info": "You have not supplied a valid API Access Key." } }"#;
        let err = ExchangeRatesApiProvider::rate_from_response("DKK", "USD", json).unwrap_err();
        assert!(err.to_string().contains("valid API Access Key"));
    }
}
