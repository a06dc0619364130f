//! Assessapp Core - Domain entities, services, and traits.
//!
//! This crate contains the investment-decision engine: position models,
//! the metrics engine, the data-sourcing pipeline, history and alerting,
//! portfolio aggregation and the refresh scheduler.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod alerts;
pub mod constants;
pub mod errors;
pub mod fx;
pub mod history;
pub mod metrics;
pub mod portfolio;
pub mod positions;
pub mod refresh;
pub mod scheduler;
pub mod settings;
pub mod sourcing;

pub use metrics::{MetricsConfig, MetricsEngine};
pub use positions::{Assessment, DerivedMetrics, Position, UpdateFrequency};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
