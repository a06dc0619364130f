//! Temporary databases and fixtures for repository tests.

use chrono::{TimeZone, Utc};
use std::sync::Arc;
use tempfile::TempDir;

use crate::db::{create_pool, init, run_migrations, spawn_writer, DbPool, WriteHandle};
use assessapp_core::positions::{
    Assessment, DerivedMetrics, Position, Provenance, UpdateFrequency,
};

/// A migrated database in a temp directory. Dropping it removes the files.
pub struct TestDb {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    _dir: TempDir,
}

impl TestDb {
    /// Must be called from inside a Tokio runtime (the writer is spawned).
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = dir.path().join("data").join("test.db");
        let db_path = init(&db_path.to_string_lossy()).expect("Failed to init database");
        let pool = create_pool(&db_path).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone()).expect("Failed to spawn writer");
        Self {
            pool,
            writer,
            _dir: dir,
        }
    }

    pub fn pool(&self) -> Arc<DbPool> {
        Arc::clone(&self.pool)
    }

    pub fn writer(&self) -> WriteHandle {
        self.writer.clone()
    }
}

pub fn sample_position(position_id: &str, symbol: &str) -> Position {
    let at = Utc.with_ymd_and_hms(2024, 5, 6, 9, 30, 0).unwrap();
    Position {
        id: position_id.to_string(),
        ticker: symbol.to_string(),
        isin: Some("US0378331005".to_string()),
        company_name: format!("{symbol} Inc."),
        sector: Some("Technology".to_string()),
        currency: "USD".to_string(),
        update_frequency: UpdateFrequency::Daily,
        is_active: true,
        current_price: 100.0,
        fair_value: 120.0,
        probability_positive: 0.65,
        downside_risk: Some(-20.0),
        beta: 1.1,
        volatility: 22.0,
        pe_ratio: 28.5,
        eps_growth_rate: 12.0,
        debt_to_ebitda: 0.8,
        dividend_yield: 0.5,
        shares_owned: 10.0,
        avg_price_local: 90.0,
        current_value_base: 1000.0,
        unrealized_pnl_base: 100.0,
        weight: 0.0,
        metrics: DerivedMetrics {
            upside_potential: 20.0,
            effective_downside_risk: -20.0,
            b_ratio: 1.0,
            expected_value: 6.0,
            kelly_fraction: 30.0,
            half_kelly_suggested: 15.0,
            buy_zone_min: 90.0,
            buy_zone_max: 100.0,
            assessment: Assessment::Hold,
        },
        provenance: Provenance {
            data_source: "ALPHA_VANTAGE".to_string(),
            fair_value_source: "ALPHA_VANTAGE consensus target, 2024-05-06".to_string(),
            quote_fetched_at: Some(at),
            fundamentals_fetched_at: Some(at),
            analysis_fetched_at: None,
            stale: false,
            last_error: None,
        },
        comment: None,
        created_at: at,
        updated_at: at,
    }
}
