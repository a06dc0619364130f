use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use super::model::ExchangeRateDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::exchange_rates;
use crate::schema::exchange_rates::dsl::*;
use assessapp_core::errors::Result;
use assessapp_core::fx::{ExchangeRate, FxRepositoryTrait};

pub struct FxRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl FxRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        FxRepository { pool, writer }
    }
}

#[async_trait]
impl FxRepositoryTrait for FxRepository {
    fn get_rate(&self, code: &str) -> Result<Option<ExchangeRate>> {
        let mut conn = get_connection(&self.pool)?;
        let row = exchange_rates
            .find(code.to_uppercase())
            .select(ExchangeRateDB::as_select())
            .first::<ExchangeRateDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(ExchangeRate::from))
    }

    fn list_rates(&self) -> Result<Vec<ExchangeRate>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = exchange_rates
            .select(ExchangeRateDB::as_select())
            .order(currency_code.asc())
            .load::<ExchangeRateDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(ExchangeRate::from).collect())
    }

    async fn upsert_rate(&self, exchange_rate: ExchangeRate) -> Result<ExchangeRate> {
        let row: ExchangeRateDB = exchange_rate.into();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<ExchangeRate> {
                let stored = diesel::insert_into(exchange_rates::table)
                    .values(&row)
                    .on_conflict(currency_code)
                    .do_update()
                    .set(&row)
                    .returning(ExchangeRateDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(stored.into())
            })
            .await
    }
}
