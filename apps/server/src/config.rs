use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail};
use assessapp_core::constants::{
    DEFAULT_BASE_CURRENCY, DEFAULT_HISTORY_RETENTION, DEFAULT_SELL_THRESHOLD, DEFAULT_TARGET_EV,
};
use assessapp_core::refresh::UnavailablePolicy;
use assessapp_market_data::provider::xai::DEFAULT_MODEL;

const DEFAULT_DB_PATH: &str = "./data/assessapp.db";

/// Server configuration, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub alpha_vantage_api_key: Option<String>,
    pub xai_api_key: Option<String>,
    pub xai_model: String,
    pub xai_base_url: Option<String>,
    pub exchange_rates_api_key: Option<String>,
    pub sendgrid_api_key: Option<String>,
    pub alert_email_from: Option<String>,
    pub alert_email_to: Option<String>,
    pub enable_scheduler: bool,
    pub base_currency: String,
    pub sell_threshold: f64,
    pub target_ev: f64,
    pub history_retention: usize,
    /// `None` keeps cached FX rates until overwritten
    pub fx_cache_ttl: Option<Duration>,
    pub batch_pacing: Duration,
    pub quant_timeout: Duration,
    pub analysis_timeout: Duration,
    pub refresh_failure_policy: UnavailablePolicy,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let config = Config {
            db_path: var("ASSESSAPP_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            alpha_vantage_api_key: var("ALPHA_VANTAGE_API_KEY"),
            xai_api_key: var("XAI_API_KEY"),
            xai_model: var("XAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            xai_base_url: var("XAI_BASE_URL"),
            exchange_rates_api_key: var("EXCHANGE_RATES_API_KEY"),
            sendgrid_api_key: var("SENDGRID_API_KEY"),
            alert_email_from: var("ALERT_EMAIL_FROM"),
            alert_email_to: var("ALERT_EMAIL_TO"),
            enable_scheduler: match var("ENABLE_SCHEDULER") {
                Some(v) => parse_bool("ENABLE_SCHEDULER", &v)?,
                None => true,
            },
            base_currency: var("BASE_CURRENCY")
                .map(|c| c.to_uppercase())
                .unwrap_or_else(|| DEFAULT_BASE_CURRENCY.to_string()),
            sell_threshold: parse_or("SELL_THRESHOLD", var("SELL_THRESHOLD"), DEFAULT_SELL_THRESHOLD)?,
            target_ev: parse_or("TARGET_EV", var("TARGET_EV"), DEFAULT_TARGET_EV)?,
            history_retention: parse_or(
                "HISTORY_RETENTION",
                var("HISTORY_RETENTION"),
                DEFAULT_HISTORY_RETENTION,
            )?,
            fx_cache_ttl: var("FX_CACHE_TTL_SECS")
                .map(|v| parse_value::<u64>("FX_CACHE_TTL_SECS", &v))
                .transpose()?
                .map(Duration::from_secs),
            batch_pacing: Duration::from_millis(parse_or(
                "BATCH_PACING_MS",
                var("BATCH_PACING_MS"),
                1000u64,
            )?),
            quant_timeout: Duration::from_secs(parse_or(
                "QUANT_TIMEOUT_SECS",
                var("QUANT_TIMEOUT_SECS"),
                15u64,
            )?),
            analysis_timeout: Duration::from_secs(parse_or(
                "ANALYSIS_TIMEOUT_SECS",
                var("ANALYSIS_TIMEOUT_SECS"),
                90u64,
            )?),
            refresh_failure_policy: parse_or(
                "REFRESH_FAILURE_POLICY",
                var("REFRESH_FAILURE_POLICY"),
                UnavailablePolicy::default(),
            )?,
        };

        if config.history_retention == 0 {
            bail!("HISTORY_RETENTION must be at least 1");
        }
        if config.base_currency.len() != 3 {
            bail!("BASE_CURRENCY must be a 3-letter code, got '{}'", config.base_currency);
        }

        Ok(config)
    }

    /// E-mail delivery needs a key and both addresses.
    pub fn email(&self) -> Option<(&str, &str, &str)> {
        match (
            self.sendgrid_api_key.as_deref(),
            self.alert_email_from.as_deref(),
            self.alert_email_to.as_deref(),
        ) {
            (Some(key), Some(from), Some(to)) => Some((key, from, to)),
            _ => None,
        }
    }
}

fn parse_value<T>(key: &str, raw: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse::<T>()
        .map_err(|e| anyhow!("Invalid value '{}' for {}: {}", raw, key, e))
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        Some(v) => parse_value(key, &v),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, raw: &str) -> anyhow::Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("Invalid value '{}' for {}: expected true or false", raw, key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.db_path, DEFAULT_DB_PATH);
        assert_eq!(config.xai_model, DEFAULT_MODEL);
        assert!(config.enable_scheduler);
        assert_eq!(config.base_currency, "USD");
        assert_eq!(config.sell_threshold, -5.0);
        assert_eq!(config.target_ev, 15.0);
        assert_eq!(config.history_retention, 100);
        assert_eq!(config.fx_cache_ttl, None);
        assert_eq!(config.batch_pacing, Duration::from_millis(1000));
        assert_eq!(config.quant_timeout, Duration::from_secs(15));
        assert_eq!(config.analysis_timeout, Duration::from_secs(90));
        assert_eq!(config.refresh_failure_policy, UnavailablePolicy::PreserveStale);
        assert!(config.email().is_none());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_from(&[
            ("ENABLE_SCHEDULER", "false"),
            ("BASE_CURRENCY", "eur"),
            ("SELL_THRESHOLD", "-3"),
            ("FX_CACHE_TTL_SECS", "3600"),
            ("REFRESH_FAILURE_POLICY", "overwrite"),
            ("SENDGRID_API_KEY", "sg-key"),
            ("ALERT_EMAIL_FROM", "alerts@example.com"),
            ("ALERT_EMAIL_TO", "me@example.com"),
            ("XAI_API_KEY", "  "),
        ])
        .unwrap();
        assert!(!config.enable_scheduler);
        assert_eq!(config.base_currency, "EUR");
        assert_eq!(config.sell_threshold, -3.0);
        assert_eq!(config.fx_cache_ttl, Some(Duration::from_secs(3600)));
        assert_eq!(config.refresh_failure_policy, UnavailablePolicy::Overwrite);
        assert_eq!(
            config.email(),
            Some(("sg-key", "alerts@example.com", "me@example.com"))
        );
        assert_eq!(config.xai_api_key, None);
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let err = config_from(&[("TARGET_EV", "fifteen")]).unwrap_err();
        assert!(err.to_string().contains("TARGET_EV"));
        assert!(config_from(&[("HISTORY_RETENTION", "0")]).is_err());
        assert!(config_from(&[("ENABLE_SCHEDULER", "maybe")]).is_err());
        assert!(config_from(&[("REFRESH_FAILURE_POLICY", "drop")]).is_err());
    }
}
