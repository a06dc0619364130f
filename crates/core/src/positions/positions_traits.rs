use async_trait::async_trait;

use super::positions_model::{Position, UpdateFrequency};
use crate::errors::Result;

/// Trait defining the contract for position persistence.
#[async_trait]
pub trait PositionRepositoryTrait: Send + Sync {
    fn get_by_id(&self, position_id: &str) -> Result<Position>;

    fn list(&self, is_active_filter: Option<bool>) -> Result<Vec<Position>>;

    /// Active positions refreshed on the given cadence.
    fn list_by_frequency(&self, frequency: UpdateFrequency) -> Result<Vec<Position>>;

    async fn create(&self, position: Position) -> Result<Position>;

    /// Replace every column of an existing position.
    async fn update(&self, position: Position) -> Result<Position>;

    /// Persist portfolio weights as `(position_id, weight)` pairs.
    async fn update_weights(&self, weights: Vec<(String, f64)>) -> Result<usize>;

    async fn delete(&self, position_id: &str) -> Result<usize>;
}
