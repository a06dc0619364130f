//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all provider calls
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur while talking to an external provider.
///
/// Each variant is classified into a [`RetryClass`] via the [`retry_class`](Self::retry_class)
/// method, which determines whether [`RetryPolicy`](crate::RetryPolicy) calls the
/// provider again.
#[derive(Error, Debug, Clone)]
pub enum MarketDataError {
    /// The requested symbol was not found by the provider.
    /// This is a terminal error - retrying won't help.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider answered but had nothing usable for the symbol
    /// (for example a quote without a price).
    #[error("No data from {provider} for {symbol}")]
    NoData {
        /// The provider that returned the empty payload
        provider: String,
        /// The requested symbol
        symbol: String,
    },

    /// The provider rate limited the request (HTTP 429 or an in-band notice).
    /// Should retry with exponential backoff.
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    /// Should retry with exponential backoff.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// Connection failure or a 5xx answer.
    /// Should retry with exponential backoff.
    #[error("Transport error: {provider} - {message}")]
    Transport {
        /// The provider that could not be reached
        provider: String,
        /// The underlying failure
        message: String,
    },

    /// A provider-specific application error (bad key, 4xx, in-band error message).
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider responded but the payload does not match the expected structure.
    #[error("Schema error: {provider} - {message}")]
    Schema {
        /// The provider whose payload failed to parse
        provider: String,
        /// The parse failure
        message: String,
    },

    /// The provider does not implement the requested operation.
    #[error("{operation} not supported by {provider}")]
    NotSupported {
        /// Operation name
        operation: String,
        /// The provider
        provider: String,
    },
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// - [`RetryClass::WithBackoff`]: transport-level, call the same provider again after a delay
    /// - [`RetryClass::NextProvider`]: this provider can't help now, move on
    /// - [`RetryClass::Never`]: the request itself is hopeless for this provider
    ///
    /// # Examples
    ///
    /// ```
    /// use assessapp_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::RateLimited { provider: "ALPHA_VANTAGE".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    ///
    /// let error = MarketDataError::SymbolNotFound("INVALID".to_string());
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::SymbolNotFound(_) | Self::Schema { .. } | Self::NotSupported { .. } => {
                RetryClass::Never
            }

            Self::RateLimited { .. } | Self::Timeout { .. } | Self::Transport { .. } => {
                RetryClass::WithBackoff
            }

            Self::ProviderError { .. } | Self::NoData { .. } => RetryClass::NextProvider,
        }
    }

    /// Map a reqwest send/read failure onto the taxonomy.
    pub fn from_reqwest(provider: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                provider: provider.to_string(),
            }
        } else if err.is_connect() || err.is_request() || err.is_body() {
            Self::Transport {
                provider: provider.to_string(),
                message: err.to_string(),
            }
        } else if err.is_decode() {
            Self::Schema {
                provider: provider.to_string(),
                message: err.to_string(),
            }
        } else {
            Self::ProviderError {
                provider: provider.to_string(),
                message: err.to_string(),
            }
        }
    }

    /// Map a non-success HTTP status onto the taxonomy.
    pub fn from_status(provider: &str, status: reqwest::StatusCode, body: &str) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Self::RateLimited {
                provider: provider.to_string(),
            };
        }
        let message = if body.is_empty() {
            format!("HTTP {}", status)
        } else {
            format!("HTTP {}: {}", status, truncate(body, 200))
        };
        if status.is_server_error() || status == reqwest::StatusCode::REQUEST_TIMEOUT {
            Self::Transport {
                provider: provider.to_string(),
                message,
            }
        } else {
            Self::ProviderError {
                provider: provider.to_string(),
                message,
            }
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
