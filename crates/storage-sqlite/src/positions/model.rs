//! Database model for positions.

use diesel::prelude::*;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::utils::{
    format_optional_timestamp, format_timestamp, parse_optional_timestamp, parse_timestamp,
};
use assessapp_core::positions::{Assessment, DerivedMetrics, Position, Provenance};

/// One row per position, carrying raw inputs, derived metrics and provenance.
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::positions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct PositionDB {
    pub id: String,
    pub ticker: String,
    pub isin: Option<String>,
    pub company_name: String,
    pub sector: Option<String>,
    pub currency: String,
    pub update_frequency: String,
    pub is_active: bool,
    pub current_price: f64,
    pub fair_value: f64,
    pub probability_positive: f64,
    pub downside_risk: Option<f64>,
    pub beta: f64,
    pub volatility: f64,
    pub pe_ratio: f64,
    pub eps_growth_rate: f64,
    pub debt_to_ebitda: f64,
    pub dividend_yield: f64,
    pub shares_owned: f64,
    pub avg_price_local: f64,
    pub current_value_base: f64,
    pub unrealized_pnl_base: f64,
    pub weight: f64,
    pub upside_potential: f64,
    pub effective_downside_risk: f64,
    pub b_ratio: f64,
    pub expected_value: f64,
    pub kelly_fraction: f64,
    pub half_kelly_suggested: f64,
    pub buy_zone_min: f64,
    pub buy_zone_max: f64,
    pub assessment: String,
    pub data_source: String,
    pub fair_value_source: String,
    pub quote_fetched_at: Option<String>,
    pub fundamentals_fetched_at: Option<String>,
    pub analysis_fetched_at: Option<String>,
    pub stale: bool,
    pub last_error: Option<String>,
    pub comment: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub(crate) fn parse_assessment(value: &str) -> Assessment {
    value.parse().unwrap_or_else(|_| {
        warn!("Unknown stored assessment '{}', treating as Unavailable", value);
        Assessment::Unavailable
    })
}

impl From<PositionDB> for Position {
    fn from(db: PositionDB) -> Self {
        let update_frequency = db.update_frequency.parse().unwrap_or_else(|_| {
            warn!(
                "Unknown update frequency '{}' on position {}, using daily",
                db.update_frequency, db.id
            );
            Default::default()
        });

        Position {
            update_frequency,
            metrics: DerivedMetrics {
                upside_potential: db.upside_potential,
                effective_downside_risk: db.effective_downside_risk,
                b_ratio: db.b_ratio,
                expected_value: db.expected_value,
                kelly_fraction: db.kelly_fraction,
                half_kelly_suggested: db.half_kelly_suggested,
                buy_zone_min: db.buy_zone_min,
                buy_zone_max: db.buy_zone_max,
                assessment: parse_assessment(&db.assessment),
            },
            provenance: Provenance {
                data_source: db.data_source,
                fair_value_source: db.fair_value_source,
                quote_fetched_at: parse_optional_timestamp(db.quote_fetched_at.as_deref()),
                fundamentals_fetched_at: parse_optional_timestamp(
                    db.fundamentals_fetched_at.as_deref(),
                ),
                analysis_fetched_at: parse_optional_timestamp(db.analysis_fetched_at.as_deref()),
                stale: db.stale,
                last_error: db.last_error,
            },
            created_at: parse_timestamp(&db.created_at),
            updated_at: parse_timestamp(&db.updated_at),
            id: db.id,
            ticker: db.ticker,
            isin: db.isin,
            company_name: db.company_name,
            sector: db.sector,
            currency: db.currency,
            is_active: db.is_active,
            current_price: db.current_price,
            fair_value: db.fair_value,
            probability_positive: db.probability_positive,
            downside_risk: db.downside_risk,
            beta: db.beta,
            volatility: db.volatility,
            pe_ratio: db.pe_ratio,
            eps_growth_rate: db.eps_growth_rate,
            debt_to_ebitda: db.debt_to_ebitda,
            dividend_yield: db.dividend_yield,
            shares_owned: db.shares_owned,
            avg_price_local: db.avg_price_local,
            current_value_base: db.current_value_base,
            unrealized_pnl_base: db.unrealized_pnl_base,
            weight: db.weight,
            comment: db.comment,
        }
    }
}

impl From<Position> for PositionDB {
    fn from(domain: Position) -> Self {
        let m = domain.metrics;
        let p = domain.provenance;
        Self {
            id: domain.id,
            ticker: domain.ticker,
            isin: domain.isin,
            company_name: domain.company_name,
            sector: domain.sector,
            currency: domain.currency,
            update_frequency: domain.update_frequency.as_str().to_string(),
            is_active: domain.is_active,
            current_price: domain.current_price,
            fair_value: domain.fair_value,
            probability_positive: domain.probability_positive,
            downside_risk: domain.downside_risk,
            beta: domain.beta,
            volatility: domain.volatility,
            pe_ratio: domain.pe_ratio,
            eps_growth_rate: domain.eps_growth_rate,
            debt_to_ebitda: domain.debt_to_ebitda,
            dividend_yield: domain.dividend_yield,
            shares_owned: domain.shares_owned,
            avg_price_local: domain.avg_price_local,
            current_value_base: domain.current_value_base,
            unrealized_pnl_base: domain.unrealized_pnl_base,
            weight: domain.weight,
            upside_potential: m.upside_potential,
            effective_downside_risk: m.effective_downside_risk,
            b_ratio: m.b_ratio,
            expected_value: m.expected_value,
            kelly_fraction: m.kelly_fraction,
            half_kelly_suggested: m.half_kelly_suggested,
            buy_zone_min: m.buy_zone_min,
            buy_zone_max: m.buy_zone_max,
            assessment: m.assessment.as_str().to_string(),
            data_source: p.data_source,
            fair_value_source: p.fair_value_source,
            quote_fetched_at: format_optional_timestamp(&p.quote_fetched_at),
            fundamentals_fetched_at: format_optional_timestamp(&p.fundamentals_fetched_at),
            analysis_fetched_at: format_optional_timestamp(&p.analysis_fetched_at),
            stale: p.stale,
            last_error: p.last_error,
            comment: domain.comment,
            created_at: format_timestamp(&domain.created_at),
            updated_at: format_timestamp(&domain.updated_at),
        }
    }
}
