//! Alpha Vantage: latest price from GLOBAL_QUOTE, risk inputs from OVERVIEW
//! (beta, analyst target, P/E, yield, EPS growth).
//!
//! The free tier allows 5 calls per minute; batches pace themselves upstream.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::models::{Fundamentals, Quote};
use crate::provider::http::{build_client, redact, send_text};
use crate::provider::MarketDataProvider;

const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";
pub const PROVIDER_ID: &str = "ALPHA_VANTAGE";

pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

/// GLOBAL_QUOTE response
#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "01. symbol")]
    symbol: Option<String>,
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "07. latest trading day")]
    latest_trading_day: Option<String>,
}

/// OVERVIEW response for company fundamentals.
/// Only includes fields the risk model uses; the API returns many more.
#[derive(Debug, Deserialize)]
struct CompanyOverviewResponse {
    #[serde(rename = "Symbol")]
    symbol: Option<String>,
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Sector")]
    sector: Option<String>,
    #[serde(rename = "Beta")]
    beta: Option<String>,
    #[serde(rename = "AnalystTargetPrice")]
    analyst_target_price: Option<String>,
    #[serde(rename = "PERatio")]
    pe_ratio: Option<String>,
    #[serde(rename = "DividendYield")]
    dividend_yield: Option<String>,
    #[serde(rename = "QuarterlyEarningsGrowthYOY")]
    quarterly_earnings_growth_yoy: Option<String>,

    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

impl CompanyOverviewResponse {
    /// Parse a string field as f64, handling "None" and "-" values
    fn parse_f64(s: &Option<String>) -> Option<f64> {
        s.as_ref()
            .filter(|v| !v.is_empty() && *v != "None" && *v != "-" && *v != "0")
            .and_then(|v| v.parse::<f64>().ok())
    }

    fn parse_text(s: &Option<String>) -> Option<String> {
        s.as_ref()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty() && *v != "None" && *v != "-")
            .map(|v| v.to_string())
    }

    fn to_fundamentals(&self, symbol: &str, fetched_at: DateTime<Utc>) -> Fundamentals {
        Fundamentals {
            symbol: symbol.to_string(),
            name: Self::parse_text(&self.name),
            sector: Self::parse_text(&self.sector),
            beta: Self::parse_f64(&self.beta),
            target_price: Self::parse_f64(&self.analyst_target_price),
            pe_ratio: Self::parse_f64(&self.pe_ratio),
            // Alpha Vantage reports fractions, fundamentals carry percent
            dividend_yield: Self::parse_f64(&self.dividend_yield).map(|v| v * 100.0),
            eps_growth_rate: Self::parse_f64(&self.quarterly_earnings_growth_yoy)
                .map(|v| v * 100.0),
            source: PROVIDER_ID.to_string(),
            fetched_at,
        }
    }
}

impl AlphaVantageProvider {
    /// Create a new Alpha Vantage provider with the given API key.
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Make a request to the Alpha Vantage API.
    async fn fetch(&self, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.push(("apikey", &self.api_key));

        let url = reqwest::Url::parse_with_params(&self.base_url, &all_params).map_err(|e| {
            MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to build URL: {}", e),
            }
        })?;

        debug!(
            "Alpha Vantage request: {}",
            redact(url.as_str(), &self.api_key)
        );

        send_text(PROVIDER_ID, self.client.get(url)).await
    }

    /// Check for API-level errors in the response.
    fn check_api_error(
        error_message: &Option<String>,
        note: &Option<String>,
        information: &Option<String>,
    ) -> Result<(), MarketDataError> {
        if let Some(ref msg) = error_message {
            if msg.contains("Invalid API call") || msg.contains("not found") {
                return Err(MarketDataError::SymbolNotFound(msg.clone()));
            }
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: msg.clone(),
            });
        }

        // "Note" usually indicates rate limiting
        if let Some(ref msg) = note {
            if msg.contains("API call frequency") || msg.contains("rate limit") {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            warn!("Alpha Vantage note: {}", msg);
        }

        if let Some(ref msg) = information {
            if msg.contains("API call frequency") || msg.contains("rate limit") {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            warn!("Alpha Vantage info: {}", msg);
        }

        Ok(())
    }

    fn parse_schema<T: for<'de> Deserialize<'de>>(
        text: &str,
        what: &str,
    ) -> Result<T, MarketDataError> {
        serde_json::from_str(text).map_err(|e| MarketDataError::Schema {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to parse {} response: {}", what, e),
        })
    }

    /// Parse a date string in YYYY-MM-DD format to DateTime<Utc>.
    fn parse_date(date_str: &str) -> Option<DateTime<Utc>> {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .and_then(|dt| Utc.from_local_datetime(&dt).single())
    }

    fn quote_from_response(
        symbol: &str,
        response: GlobalQuoteResponse,
    ) -> Result<Quote, MarketDataError> {
        Self::check_api_error(
            &response.error_message,
            &response.note,
            &response.information,
        )?;

        let global = response
            .global_quote
            .filter(|q| q.symbol.is_some())
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))?;

        let price = global
            .price
            .as_deref()
            .and_then(|p| p.trim().parse::<f64>().ok())
            .filter(|p| p.is_finite())
            .ok_or_else(|| MarketDataError::NoData {
                provider: PROVIDER_ID.to_string(),
                symbol: symbol.to_string(),
            })?;

        let timestamp = global
            .latest_trading_day
            .as_deref()
            .and_then(Self::parse_date)
            .unwrap_or_else(Utc::now);

        Ok(Quote {
            symbol: symbol.to_string(),
            price,
            currency: None,
            timestamp,
            source: PROVIDER_ID.to_string(),
        })
    }

    fn fundamentals_from_response(
        symbol: &str,
        response: CompanyOverviewResponse,
    ) -> Result<Fundamentals, MarketDataError> {
        Self::check_api_error(
            &response.error_message,
            &response.note,
            &response.information,
        )?;

        if response.symbol.is_none() {
            return Err(MarketDataError::SymbolNotFound(format!(
                "No company overview data for symbol: {}",
                symbol
            )));
        }

        Ok(response.to_fundamentals(symbol, Utc::now()))
    }
}

#[async_trait]
impl MarketDataProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_latest_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let params = [("function", "GLOBAL_QUOTE"), ("symbol", symbol)];
        let text = self.fetch(&params).await?;
        let response: GlobalQuoteResponse = Self::parse_schema(&text, "global quote")?;
        let quote = Self::quote_from_response(symbol, response)?;
        debug!("Alpha Vantage: {} last price {}", symbol, quote.price);
        Ok(quote)
    }

    async fn get_fundamentals(&self, symbol: &str) -> Result<Fundamentals, MarketDataError> {
        let params = [("function", "OVERVIEW"), ("symbol", symbol)];
        let text = self.fetch(&params).await?;
        let response: CompanyOverviewResponse = Self::parse_schema(&text, "company overview")?;
        let fundamentals = Self::fundamentals_from_response(symbol, response)?;
        debug!("Alpha Vantage: fetched company overview for {}", symbol);
        Ok(fundamentals)
    }
}
