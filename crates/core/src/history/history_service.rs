use chrono::Utc;
use log::debug;
use std::sync::Arc;

use super::history_model::HistorySnapshot;
use super::history_traits::HistoryRepositoryTrait;
use crate::errors::Result;
use crate::positions::Position;

/// Appends snapshots and enforces per-position retention.
pub struct HistoryRecorder {
    repository: Arc<dyn HistoryRepositoryTrait>,
    retention: usize,
}

impl HistoryRecorder {
    pub fn new(repository: Arc<dyn HistoryRepositoryTrait>, retention: usize) -> Self {
        Self {
            repository,
            retention: retention.max(1),
        }
    }

    pub async fn record(&self, position: &Position) -> Result<HistorySnapshot> {
        let snapshot = HistorySnapshot::capture(position, Utc::now());
        let saved = self.repository.append(snapshot).await?;
        let pruned = self.repository.prune(&position.id, self.retention).await?;
        if pruned > 0 {
            debug!(
                "Pruned {} snapshots of {} beyond retention of {}",
                pruned, position.ticker, self.retention
            );
        }
        Ok(saved)
    }

    pub fn recent(&self, position_id: &str, limit: i64) -> Result<Vec<HistorySnapshot>> {
        self.repository.list_for_position(position_id, limit)
    }
}
