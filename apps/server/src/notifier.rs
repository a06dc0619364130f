//! Alert transports: SendGrid e-mail, or the log when e-mail is not configured.

use std::time::Duration;

use assessapp_core::alerts::{Alert, NotificationTransport};
use assessapp_core::errors::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{info, warn};

const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";
const SENDER_NAME: &str = "Stock Tracker Alerts";
const RECIPIENT_NAME: &str = "Admin";

pub struct SendGridNotifier {
    client: Client,
    api_key: String,
    from: String,
    to: String,
}

impl SendGridNotifier {
    pub fn new(api_key: &str, from: &str, to: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build e-mail client with timeout: {}", e);
                Client::new()
            });
        Self {
            client,
            api_key: api_key.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

pub fn subject(alert: &Alert) -> String {
    format!("Stock Alert: {} - {}", alert.ticker, alert.kind)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// SendGrid v3 `mail/send` body with a plain-text and an HTML part.
pub fn build_payload(alert: &Alert, from: &str, to: &str) -> Value {
    let at = alert.created_at.format("%Y-%m-%d %H:%M:%S");
    let text = format!(
        "Alert for {}:\n\nType: {}\nMessage: {}\n\nGenerated at: {}",
        alert.ticker, alert.kind, alert.message, at
    );
    let html = format!(
        "<html><body><h2>Stock Alert: {}</h2>\
         <p><strong>Type:</strong> {}</p>\
         <p><strong>Message:</strong> {}</p>\
         <p><strong>Time:</strong> {}</p></body></html>",
        escape_html(&alert.ticker),
        alert.kind,
        escape_html(&alert.message),
        at
    );

    json!({
        "personalizations": [{ "to": [{ "email": to, "name": RECIPIENT_NAME }] }],
        "from": { "email": from, "name": SENDER_NAME },
        "subject": subject(alert),
        "content": [
            { "type": "text/plain", "value": text },
            { "type": "text/html", "value": html }
        ]
    })
}

#[async_trait]
impl NotificationTransport for SendGridNotifier {
    fn name(&self) -> &'static str {
        "sendgrid"
    }

    async fn send(&self, alert: &Alert) -> Result<()> {
        let response = self
            .client
            .post(SENDGRID_URL)
            .bearer_auth(&self.api_key)
            .json(&build_payload(alert, &self.from, &self.to))
            .send()
            .await
            .map_err(|e| Error::Unexpected(format!("Failed to send e-mail: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Unexpected(format!(
                "E-mail service returned status {}: {}",
                status, body
            )));
        }

        info!(ticker = %alert.ticker, "Alert e-mail sent");
        Ok(())
    }
}

/// Writes alerts to the log. Used when no e-mail transport is configured.
pub struct LogNotifier;

#[async_trait]
impl NotificationTransport for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, alert: &Alert) -> Result<()> {
        info!(
            ticker = %alert.ticker,
            kind = %alert.kind,
            "{}: {}",
            subject(alert),
            alert.message
        );
        Ok(())
    }
}
