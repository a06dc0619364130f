//! Metrics engine - pure derivation of EV, Kelly sizing, buy zone and assessment.

mod metrics_engine;

pub use metrics_engine::{calibrate_downside, MetricWarning, MetricsConfig, MetricsEngine};
