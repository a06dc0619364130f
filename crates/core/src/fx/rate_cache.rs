use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct RateCacheConfig {
    /// `None` keeps entries until they are overwritten or invalidated
    pub ttl: Option<Duration>,
}

/// Shared currency-rate cache, keyed by currency code. Last writer wins.
#[derive(Debug, Default)]
pub struct RateCache {
    entries: RwLock<HashMap<String, (f64, DateTime<Utc>)>>,
    ttl: Option<chrono::Duration>,
}

impl RateCache {
    pub fn new(config: RateCacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: config
                .ttl
                .and_then(|ttl| chrono::Duration::from_std(ttl).ok()),
        }
    }

    pub fn get(&self, currency: &str) -> Option<f64> {
        self.get_at(currency, Utc::now())
    }

    pub fn get_at(&self, currency: &str, now: DateTime<Utc>) -> Option<f64> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let (rate, stored_at) = entries.get(&currency.to_uppercase())?;
        match self.ttl {
            Some(ttl) if now - *stored_at > ttl => None,
            _ => Some(*rate),
        }
    }

    pub fn put(&self, currency: &str, rate: f64) {
        self.put_at(currency, rate, Utc::now());
    }

    pub fn put_at(&self, currency: &str, rate: f64, at: DateTime<Utc>) {
        if !(rate.is_finite() && rate > 0.0) {
            log::warn!("Ignoring unusable rate {} for {}", rate, currency);
            return;
        }
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(currency.to_uppercase(), (rate, at));
    }

    pub fn invalidate(&self, currency: &str) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.remove(&currency.to_uppercase());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_overwrites_previous_rate() {
        let cache = RateCache::default();
        cache.put("eur", 1.05);
        cache.put("EUR", 1.10);
        assert_eq!(cache.get("EUR"), Some(1.10));
    }

    #[test]
    fn test_entries_expire_after_ttl() {
        let cache = RateCache::new(RateCacheConfig {
            ttl: Some(Duration::from_secs(60)),
        });
        let stored = Utc::now();
        cache.put_at("GBP", 1.27, stored);

        assert_eq!(cache.get_at("GBP", stored + chrono::Duration::seconds(30)), Some(1.27));
        assert_eq!(cache.get_at("GBP", stored + chrono::Duration::seconds(61)), None);
    }

    #[test]
    fn test_no_ttl_never_expires() {
        let cache = RateCache::default();
        let stored = Utc::now();
        cache.put_at("JPY", 0.0067, stored);
        assert_eq!(
            cache.get_at("JPY", stored + chrono::Duration::days(365)),
            Some(0.0067)
        );
    }

    #[test]
    fn test_unusable_rate_is_ignored() {
        let cache = RateCache::default();
        cache.put("CHF", 0.0);
        cache.put("SEK", f64::NAN);
        assert_eq!(cache.get("CHF"), None);
        assert_eq!(cache.get("SEK"), None);
    }

    #[test]
    fn test_invalidate() {
        let cache = RateCache::default();
        cache.put("EUR", 1.1);
        cache.invalidate("eur");
        assert_eq!(cache.get("EUR"), None);
    }
}
