//! xAI chat-completions provider for structured stock analysis.

mod prompt;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::models::{AnalysisRequest, StockAnalysis};
use crate::provider::http::{build_client, send_text};
use crate::provider::AnalysisProvider;

const DEFAULT_BASE_URL: &str = "https://api.x.ai/v1";
pub const DEFAULT_MODEL: &str = "grok-4-fast-reasoning";
pub const PROVIDER_ID: &str = "XAI";

pub struct XaiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl XaiProvider {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn schema_error(message: String) -> MarketDataError {
        MarketDataError::Schema {
            provider: PROVIDER_ID.to_string(),
            message,
        }
    }

    /// Extract and validate the analysis object from a raw chat-completions body.
    fn parse_completion(body: &str) -> Result<StockAnalysis, MarketDataError> {
        let response: ChatResponse = serde_json::from_str(body)
            .map_err(|e| Self::schema_error(format!("Invalid completion envelope: {}", e)))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Self::schema_error("Completion has no content".to_string()))?;

        let json = strip_code_fences(&content);
        serde_json::from_str::<StockAnalysis>(json)
            .map_err(|e| Self::schema_error(format!("Analysis does not match schema: {}", e)))
    }
}

/// Remove a surrounding markdown code fence (```json ... ```) if present.
pub fn strip_code_fences(content: &str) -> &str {
    content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```JSON")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

#[async_trait]
impl AnalysisProvider for XaiProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<StockAnalysis, MarketDataError> {
        let user_prompt = prompt::build_user_prompt(request);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt::SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            stream: false,
            temperature: 0.0,
        };

        debug!("xAI analysis request for {} ({})", request.ticker, self.model);

        let url = format!("{}/chat/completions", self.base_url);
        let text = send_text(
            PROVIDER_ID,
            self.client
                .post(url)
                .bearer_auth(&self.api_key)
                .json(&body),
        )
        .await?;

        let analysis = Self::parse_completion(&text)?;
        debug!(
            "xAI analysis for {}: price {} fair value {} EV {}",
            analysis.ticker, analysis.current_price, analysis.fair_value, analysis.expected_value
        );
        Ok(analysis)
    }
}
