//! Refresh orchestration: source -> compute -> persist -> history -> alerts.

mod refresh_model;
mod refresh_service;

pub use refresh_model::{BatchReport, RefreshConfig, RefreshOutcome, UnavailablePolicy};
pub use refresh_service::{RefreshService, RefreshServiceTrait};

#[cfg(test)]
mod refresh_service_tests;
