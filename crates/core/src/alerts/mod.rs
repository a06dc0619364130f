//! Alerts - evaluation after a refresh, queueing and delivery.

mod alerts_model;
mod alerts_service;
mod alerts_traits;

pub use alerts_model::{Alert, AlertKind, DeliveryReport, NewAlert};
pub use alerts_service::{AlertDeliveryService, AlertDeliveryServiceTrait, AlertEvaluator};
pub use alerts_traits::{AlertRepositoryTrait, NotificationTransport};
