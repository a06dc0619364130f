use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use super::model::AlertDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::alerts;
use crate::schema::alerts::dsl::*;
use assessapp_core::alerts::{Alert, AlertRepositoryTrait, NewAlert};
use assessapp_core::errors::{DatabaseError, Result};

pub struct AlertRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AlertRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        AlertRepository { pool, writer }
    }
}

#[async_trait]
impl AlertRepositoryTrait for AlertRepository {
    async fn create(&self, alert: NewAlert) -> Result<Alert> {
        let queued = Alert {
            id: Uuid::new_v4().to_string(),
            position_id: alert.position_id,
            ticker: alert.ticker,
            kind: alert.kind,
            message: alert.message,
            delivered: false,
            created_at: Utc::now(),
        };
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Alert> {
                let inserted = diesel::insert_into(alerts::table)
                    .values(&AlertDB::from(&queued))
                    .returning(AlertDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(inserted.into())
            })
            .await
    }

    fn list_undelivered(&self) -> Result<Vec<Alert>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = alerts
            .filter(delivered.eq(false))
            .select(AlertDB::as_select())
            .order((created_at.asc(), id.asc()))
            .load::<AlertDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Alert::from).collect())
    }

    async fn mark_delivered(&self, alert_id: &str) -> Result<()> {
        let alert_id = alert_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let affected = diesel::update(alerts.find(&alert_id))
                    .set(delivered.eq(true))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if affected == 0 {
                    return Err(DatabaseError::NotFound(format!("alert {}", alert_id)).into());
                }
                Ok(())
            })
            .await
    }

    fn list_recent(&self, limit: i64) -> Result<Vec<Alert>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = alerts
            .select(AlertDB::as_select())
            .order((created_at.desc(), id.desc()))
            .limit(limit)
            .load::<AlertDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Alert::from).collect())
    }
}
