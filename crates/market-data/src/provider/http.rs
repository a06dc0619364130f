//! Shared HTTP plumbing for the providers.

use std::time::Duration;

use log::warn;
use reqwest::{Client, RequestBuilder};

use crate::errors::MarketDataError;

/// Build a client with the given request timeout.
pub(crate) fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!("Failed to build HTTP client with timeout: {}", e);
            Client::new()
        })
}

/// Send a request and return the body of a 2xx answer.
///
/// Timeouts, connection failures and 5xx answers map to retryable errors,
/// HTTP 429 to `RateLimited`, other statuses to `ProviderError`.
pub(crate) async fn send_text(
    provider: &str,
    request: RequestBuilder,
) -> Result<String, MarketDataError> {
    let response = request
        .send()
        .await
        .map_err(|e| MarketDataError::from_reqwest(provider, e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| MarketDataError::from_reqwest(provider, e))?;

    if !status.is_success() {
        return Err(MarketDataError::from_status(provider, status, &body));
    }

    Ok(body)
}

/// Replace a secret with `***` before logging.
pub(crate) fn redact(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        text.to_string()
    } else {
        text.replace(secret, "***")
    }
}
