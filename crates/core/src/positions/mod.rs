//! Positions module - domain models, typed updates, services, and traits.

mod positions_model;
mod positions_service;
mod positions_traits;
mod positions_update;

pub use positions_model::{
    Assessment, DerivedMetrics, NewPosition, Position, Provenance, UpdateFrequency,
};
pub use positions_service::{PositionService, PositionServiceTrait};
pub use positions_traits::PositionRepositoryTrait;
pub use positions_update::PositionUpdate;
