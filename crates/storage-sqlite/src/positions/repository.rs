use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use super::model::PositionDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::positions;
use crate::schema::positions::dsl::*;
use assessapp_core::errors::Result;
use assessapp_core::positions::{Position, PositionRepositoryTrait, UpdateFrequency};

pub struct PositionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PositionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        PositionRepository { pool, writer }
    }
}

#[async_trait]
impl PositionRepositoryTrait for PositionRepository {
    fn get_by_id(&self, position_id: &str) -> Result<Position> {
        let mut conn = get_connection(&self.pool)?;
        let row = positions
            .find(position_id)
            .select(PositionDB::as_select())
            .first::<PositionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(row.into())
    }

    fn list(&self, is_active_filter: Option<bool>) -> Result<Vec<Position>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = positions::table
            .select(PositionDB::as_select())
            .into_boxed();
        if let Some(active) = is_active_filter {
            query = query.filter(is_active.eq(active));
        }
        let rows = query
            .order(ticker.asc())
            .load::<PositionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Position::from).collect())
    }

    fn list_by_frequency(&self, frequency: UpdateFrequency) -> Result<Vec<Position>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = positions
            .filter(is_active.eq(true))
            .filter(update_frequency.eq(frequency.as_str()))
            .select(PositionDB::as_select())
            .order(ticker.asc())
            .load::<PositionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Position::from).collect())
    }

    async fn create(&self, position: Position) -> Result<Position> {
        let row: PositionDB = position.into();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Position> {
                let inserted = diesel::insert_into(positions::table)
                    .values(&row)
                    .returning(PositionDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(inserted.into())
            })
            .await
    }

    async fn update(&self, position: Position) -> Result<Position> {
        let row: PositionDB = position.into();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Position> {
                let updated = diesel::update(positions.find(row.id.clone()))
                    .set(&row)
                    .returning(PositionDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(updated.into())
            })
            .await
    }

    async fn update_weights(&self, weights: Vec<(String, f64)>) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut affected_rows = 0;
                for (position_id, new_weight) in weights {
                    affected_rows += diesel::update(positions.find(position_id))
                        .set(weight.eq(new_weight))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(affected_rows)
            })
            .await
    }

    async fn delete(&self, position_id: &str) -> Result<usize> {
        let position_id = position_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(positions.find(position_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_position, TestDb};
    use assessapp_core::errors::{DatabaseError, Error};
    use assessapp_core::positions::Assessment;

    #[tokio::test]
    async fn create_then_get_round_trips_every_field() {
        let db = TestDb::new();
        let repo = PositionRepository::new(db.pool(), db.writer());
        let mut position = sample_position("p1", "AAPL");
        position.downside_risk = None;
        position.provenance.last_error = Some("previous failure".to_string());

        let created = repo.create(position.clone()).await.expect("create");
        assert_eq!(created, position);
        assert_eq!(repo.get_by_id("p1").expect("get"), position);
    }

    #[tokio::test]
    async fn update_clears_nullable_columns() {
        let db = TestDb::new();
        let repo = PositionRepository::new(db.pool(), db.writer());
        let mut position = sample_position("p1", "AAPL");
        position.provenance.stale = true;
        position.provenance.last_error = Some("timeout".to_string());
        repo.create(position.clone()).await.expect("create");

        position.provenance.stale = false;
        position.provenance.last_error = None;
        position.metrics.assessment = Assessment::Add;
        let updated = repo.update(position).await.expect("update");

        assert!(!updated.provenance.stale);
        assert_eq!(updated.provenance.last_error, None);
        assert_eq!(updated.metrics.assessment, Assessment::Add);
    }

    #[tokio::test]
    async fn update_of_missing_position_is_not_found() {
        let db = TestDb::new();
        let repo = PositionRepository::new(db.pool(), db.writer());
        let err = repo
            .update(sample_position("ghost", "NOPE"))
            .await
            .expect_err("missing row");
        assert!(matches!(err, Error::Database(DatabaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_by_frequency_returns_active_matching_positions() {
        let db = TestDb::new();
        let repo = PositionRepository::new(db.pool(), db.writer());

        let daily = sample_position("p1", "MSFT");
        let mut weekly = sample_position("p2", "SAP");
        weekly.update_frequency = UpdateFrequency::Weekly;
        let mut inactive = sample_position("p3", "AAPL");
        inactive.is_active = false;
        for p in [daily, weekly, inactive] {
            repo.create(p).await.expect("create");
        }

        let due: Vec<String> = repo
            .list_by_frequency(UpdateFrequency::Daily)
            .expect("list")
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(due, vec!["p1".to_string()]);

        assert_eq!(repo.list(None).expect("all").len(), 3);
        assert_eq!(repo.list(Some(false)).expect("inactive").len(), 1);
    }

    #[tokio::test]
    async fn update_weights_and_delete() {
        let db = TestDb::new();
        let repo = PositionRepository::new(db.pool(), db.writer());
        repo.create(sample_position("p1", "MSFT")).await.expect("create");
        repo.create(sample_position("p2", "SAP")).await.expect("create");

        let affected = repo
            .update_weights(vec![("p1".to_string(), 60.0), ("p2".to_string(), 40.0)])
            .await
            .expect("weights");
        assert_eq!(affected, 2);
        assert_eq!(repo.get_by_id("p1").expect("get").weight, 60.0);

        assert_eq!(repo.delete("p2").await.expect("delete"), 1);
        assert_eq!(repo.list(None).expect("list").len(), 1);
    }
}
