//! Prompt construction for the strategy-aware stock analysis.

use crate::models::AnalysisRequest;

pub(crate) const SYSTEM_PROMPT: &str =
    "You are a financial analyst. Respond only with a single valid JSON object, no additional text.";

/// Build the user prompt for one analysis request.
///
/// The rules block mirrors the local metrics engine so the provider's derived
/// fields can be checked against a local recomputation.
pub(crate) fn build_user_prompt(request: &AnalysisRequest) -> String {
    let rules = &request.rules;
    let sector = request.sector.as_deref().unwrap_or("Unknown");
    let company = if request.company_name.is_empty() {
        request.ticker.as_str()
    } else {
        request.company_name.as_str()
    };

    format!(
        r#"Analyze the stock {ticker} ({company}) in the {sector} sector, quoted in {currency}.

Strategy rules:
- Expected value: EV = p * upside% + (1 - p) * downside%.
- Kelly: f* = ((b * p) - (1 - p)) / b * 100 with b = upside% / |downside%|; floor at 0.
- Half-Kelly sizing = f* / 2, capped at {cap}%.
- Probability p defaults to {p}; use 0.7 for a Strong Buy consensus and 0.5 for Hold.
- Downside calibrated by beta: below 0.5 = -15%, 0.5 to 1 = -20%, 1 to 1.5 = -25%, 1.5 and above = -30%.
- Buy zone: the price range where EV reaches {target}%.
- Assessment: "Add" if EV > {add}, "Hold" if EV > 0, "Trim" if EV > {sell}, otherwise "Sell".

Requirements:
- "current_price" is the latest real trading price.
- "fair_value" is the median 12-month analyst consensus target price.
- "exchange_rate_to_base" is the number of {base} for one {currency}.

Return ONLY this JSON object with numbers where numbers are expected:
{{
  "ticker": "{ticker}",
  "company_name": string,
  "sector": string,
  "current_price": number,
  "currency": "{currency}",
  "exchange_rate_to_base": number,
  "fair_value": number,
  "beta": number,
  "volatility": number,
  "pe_ratio": number,
  "eps_growth_rate": number,
  "debt_to_ebitda": number,
  "dividend_yield": number,
  "probability_positive": number,
  "downside_risk": number,
  "upside_potential": number,
  "b_ratio": number,
  "expected_value": number,
  "kelly_fraction": number,
  "half_kelly_suggested": number,
  "buy_zone_min": number,
  "buy_zone_max": number,
  "assessment": "Add" | "Hold" | "Trim" | "Sell"
}}"#,
        ticker = request.ticker,
        company = company,
        sector = sector,
        currency = request.currency,
        base = request.base_currency,
        cap = rules.half_kelly_cap,
        p = rules.default_probability,
        target = rules.target_ev,
        add = rules.add_threshold,
        sell = rules.sell_threshold,
    )
}
