use async_trait::async_trait;

use super::history_model::HistorySnapshot;
use crate::errors::Result;

/// Append-only snapshot store.
#[async_trait]
pub trait HistoryRepositoryTrait: Send + Sync {
    async fn append(&self, snapshot: HistorySnapshot) -> Result<HistorySnapshot>;

    /// Snapshots for a position, newest first.
    fn list_for_position(&self, position_id: &str, limit: i64) -> Result<Vec<HistorySnapshot>>;

    /// Delete all but the newest `keep` snapshots. Returns the number removed.
    async fn prune(&self, position_id: &str, keep: usize) -> Result<usize>;
}
