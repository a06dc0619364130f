use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use super::model::HistorySnapshotDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::history_snapshots;
use crate::schema::history_snapshots::dsl::*;
use assessapp_core::errors::Result;
use assessapp_core::history::{HistoryRepositoryTrait, HistorySnapshot};

pub struct HistoryRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl HistoryRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        HistoryRepository { pool, writer }
    }
}

#[async_trait]
impl HistoryRepositoryTrait for HistoryRepository {
    async fn append(&self, snapshot: HistorySnapshot) -> Result<HistorySnapshot> {
        let row: HistorySnapshotDB = snapshot.into();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<HistorySnapshot> {
                let inserted = diesel::insert_into(history_snapshots::table)
                    .values(&row)
                    .returning(HistorySnapshotDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(inserted.into())
            })
            .await
    }

    fn list_for_position(&self, for_position: &str, limit: i64) -> Result<Vec<HistorySnapshot>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = history_snapshots
            .filter(position_id.eq(for_position))
            .select(HistorySnapshotDB::as_select())
            .order((recorded_at.desc(), id.desc()))
            .limit(limit)
            .load::<HistorySnapshotDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(HistorySnapshot::from).collect())
    }

    async fn prune(&self, for_position: &str, keep: usize) -> Result<usize> {
        let for_position = for_position.to_string();
        let keep = i64::try_from(keep).unwrap_or(i64::MAX);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let expired: Vec<String> = history_snapshots
                    .filter(position_id.eq(&for_position))
                    .select(id)
                    .order((recorded_at.desc(), id.desc()))
                    .offset(keep)
                    .load::<String>(conn)
                    .map_err(StorageError::from)?;
                if expired.is_empty() {
                    return Ok(0);
                }
                Ok(
                    diesel::delete(history_snapshots.filter(id.eq_any(expired)))
                        .execute(conn)
                        .map_err(StorageError::from)?,
                )
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::positions::PositionRepository;
    use crate::test_support::{sample_position, TestDb};
    use assessapp_core::positions::PositionRepositoryTrait;
    use chrono::{Duration, TimeZone, Utc};

    async fn seeded(db: &TestDb) -> HistoryRepository {
        PositionRepository::new(db.pool(), db.writer())
            .create(sample_position("p1", "AAPL"))
            .await
            .expect("create position");
        HistoryRepository::new(db.pool(), db.writer())
    }

    fn snapshot_at(minutes: i64, ev: f64) -> HistorySnapshot {
        let start = Utc.with_ymd_and_hms(2024, 5, 6, 0, 0, 0).unwrap();
        let at = start + Duration::minutes(minutes);
        let mut snapshot = HistorySnapshot::capture(&sample_position("p1", "AAPL"), at);
        snapshot.expected_value = ev;
        snapshot
    }

    #[tokio::test]
    async fn lists_newest_first_with_limit() {
        let db = TestDb::new();
        let repo = seeded(&db).await;
        for (minute, ev) in [(0, 1.0), (10, 2.0), (20, 3.0)] {
            repo.append(snapshot_at(minute, ev)).await.expect("append");
        }

        let recent = repo.list_for_position("p1", 2).expect("list");
        let evs: Vec<f64> = recent.iter().map(|s| s.expected_value).collect();
        assert_eq!(evs, vec![3.0, 2.0]);
    }

    #[tokio::test]
    async fn prune_keeps_only_newest() {
        let db = TestDb::new();
        let repo = seeded(&db).await;
        for minute in 0..5 {
            repo.append(snapshot_at(minute, minute as f64))
                .await
                .expect("append");
        }

        assert_eq!(repo.prune("p1", 2).await.expect("prune"), 3);
        assert_eq!(repo.prune("p1", 2).await.expect("prune again"), 0);

        let evs: Vec<f64> = repo
            .list_for_position("p1", 10)
            .expect("list")
            .iter()
            .map(|s| s.expected_value)
            .collect();
        assert_eq!(evs, vec![4.0, 3.0]);
    }

    #[tokio::test]
    async fn snapshots_are_removed_with_their_position() {
        let db = TestDb::new();
        let repo = seeded(&db).await;
        repo.append(snapshot_at(0, 1.0)).await.expect("append");

        PositionRepository::new(db.pool(), db.writer())
            .delete("p1")
            .await
            .expect("delete");

        assert!(repo.list_for_position("p1", 10).expect("list").is_empty());
    }
}
