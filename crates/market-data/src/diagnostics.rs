//! Per-refresh record of which providers were tried and what happened.

use std::fmt;

use crate::models::ProviderId;

/// Why a provider's answer was not adopted even though the call returned.
#[derive(Clone, Debug, PartialEq)]
pub enum SkipReason {
    /// The provider responded without a positive price.
    NoUsablePrice,

    /// The provider does not implement a part of the request.
    NotSupported { operation: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoUsablePrice => f.write_str("no usable price"),
            SkipReason::NotSupported { operation } => write!(f, "{} not supported", operation),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AttemptOutcome {
    Adopted,
    Skipped(SkipReason),
    Failed(String),
}

#[derive(Clone, Debug)]
pub struct ProviderAttempt {
    pub provider_id: ProviderId,
    pub outcome: AttemptOutcome,
}

impl ProviderAttempt {
    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match &self.outcome {
            AttemptOutcome::Skipped(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Attempts in the order the pipeline made them.
#[derive(Clone, Debug, Default)]
pub struct FetchDiagnostics {
    pub attempts: Vec<ProviderAttempt>,
}

impl FetchDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, provider_id: ProviderId, outcome: AttemptOutcome) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            outcome,
        });
    }

    pub fn record_skip(&mut self, provider_id: ProviderId, reason: SkipReason) {
        self.push(provider_id, AttemptOutcome::Skipped(reason));
    }

    pub fn record_error(&mut self, provider_id: ProviderId, error: String) {
        self.push(provider_id, AttemptOutcome::Failed(error));
    }

    pub fn record_success(&mut self, provider_id: ProviderId) {
        self.push(provider_id, AttemptOutcome::Adopted);
    }

    /// One line, e.g. `ALPHA_VANTAGE failed (HTTP 503), XAI adopted`.
    pub fn summary(&self) -> String {
        if self.attempts.is_empty() {
            return "no providers configured".to_string();
        }
        self.attempts
            .iter()
            .map(|a| match &a.outcome {
                AttemptOutcome::Adopted => format!("{} adopted", a.provider_id),
                AttemptOutcome::Skipped(reason) => format!("{} skipped ({})", a.provider_id, reason),
                AttemptOutcome::Failed(err) => format!("{} failed ({})", a.provider_id, err),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn has_success(&self) -> bool {
        self.winner().is_some()
    }

    /// The provider whose answer was adopted, if any.
    pub fn winner(&self) -> Option<&ProviderId> {
        self.attempts
            .iter()
            .find(|a| a.outcome == AttemptOutcome::Adopted)
            .map(|a| &a.provider_id)
    }

    pub fn errors(&self) -> Vec<(&ProviderId, &str)> {
        self.attempts
            .iter()
            .filter_map(|a| match &a.outcome {
                AttemptOutcome::Failed(err) => Some((&a.provider_id, err.as_str())),
                _ => None,
            })
            .collect()
    }
}
