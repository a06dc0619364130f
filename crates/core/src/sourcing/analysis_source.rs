use assessapp_market_data::{
    AnalysisProvider, AnalysisRequest, MarketDataError, RetryPolicy, StockAnalysis, StrategyRules,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::str::FromStr;
use std::sync::Arc;

use super::sourcing_model::{SourceKind, SourcedFields};
use super::sourcing_traits::PositionSource;
use crate::positions::{Assessment, DerivedMetrics, Position};

/// Structured generative analysis. A successful answer carries the raw inputs
/// and the provider's own derived metrics.
pub struct AnalysisSource {
    provider: Arc<dyn AnalysisProvider>,
    retry: RetryPolicy,
    rules: StrategyRules,
    base_currency: String,
}

impl AnalysisSource {
    pub fn new(
        provider: Arc<dyn AnalysisProvider>,
        retry: RetryPolicy,
        rules: StrategyRules,
        base_currency: &str,
    ) -> Self {
        Self {
            provider,
            retry,
            rules,
            base_currency: base_currency.to_uppercase(),
        }
    }

    fn request_for(&self, position: &Position) -> AnalysisRequest {
        AnalysisRequest {
            ticker: position.ticker.clone(),
            company_name: position.company_name.clone(),
            sector: position.sector.clone(),
            currency: position.currency.clone(),
            base_currency: self.base_currency.clone(),
            rules: self.rules.clone(),
        }
    }
}

fn fields_from_analysis(
    provider_id: &str,
    analysis: StockAnalysis,
    fetched_at: DateTime<Utc>,
) -> SourcedFields {
    // An unparseable assessment fails the consistency check and gets recomputed.
    let assessment = Assessment::from_str(&analysis.assessment).unwrap_or_default();
    let derived = DerivedMetrics {
        upside_potential: analysis.upside_potential,
        effective_downside_risk: analysis.downside_risk,
        b_ratio: analysis.b_ratio,
        expected_value: analysis.expected_value,
        kelly_fraction: analysis.kelly_fraction,
        half_kelly_suggested: analysis.half_kelly_suggested,
        buy_zone_min: analysis.buy_zone_min,
        buy_zone_max: analysis.buy_zone_max,
        assessment,
    };

    SourcedFields {
        current_price: Some(analysis.current_price),
        currency: Some(analysis.currency),
        company_name: analysis.company_name,
        sector: analysis.sector,
        fair_value: Some(analysis.fair_value).filter(|v| v.is_finite() && *v >= 0.0),
        beta: Some(analysis.beta).filter(|b| b.is_finite() && *b >= 0.0),
        volatility: analysis.volatility.filter(|v| v.is_finite() && *v >= 0.0),
        pe_ratio: analysis.pe_ratio,
        eps_growth_rate: analysis.eps_growth_rate,
        debt_to_ebitda: analysis.debt_to_ebitda,
        dividend_yield: analysis.dividend_yield,
        probability_positive: Some(analysis.probability_positive)
            .filter(|p| p.is_finite() && (0.0..=1.0).contains(p)),
        downside_risk: Some(analysis.downside_risk).filter(|d| d.is_finite() && *d <= 0.0),
        derived: Some(derived),
        fx_rate_to_base: analysis
            .exchange_rate_to_base
            .filter(|r| r.is_finite() && *r > 0.0),
        data_source: provider_id.to_string(),
        fair_value_source: Some(format!(
            "{} analysis, {}",
            provider_id,
            fetched_at.format("%Y-%m-%d")
        )),
        quote_fetched_at: Some(fetched_at),
        fundamentals_fetched_at: Some(fetched_at),
        analysis_fetched_at: Some(fetched_at),
    }
}

#[async_trait]
impl PositionSource for AnalysisSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Analysis
    }

    fn id(&self) -> &'static str {
        self.provider.id()
    }

    async fn fetch(&self, position: &Position) -> Result<SourcedFields, MarketDataError> {
        let provider = self.provider.as_ref();
        let request = self.request_for(position);
        let analysis = self
            .retry
            .run(provider.id(), || provider.analyze(&request))
            .await?;
        Ok(fields_from_analysis(provider.id(), analysis, Utc::now()))
    }
}
