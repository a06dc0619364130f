use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_ALERT_THRESHOLD_EV;
use crate::errors::ValidationError;
use crate::positions::UpdateFrequency;

/// Singleton portfolio-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSettings {
    /// Tier assigned to new positions when none is given
    pub update_frequency: UpdateFrequency,
    /// Gates ev_change alerts and alert delivery
    pub alerts_enabled: bool,
    /// Minimum absolute EV move, in percentage points, for an ev_change alert
    pub alert_threshold_ev: f64,
    pub last_update_run: Option<DateTime<Utc>>,
}

impl Default for PortfolioSettings {
    fn default() -> Self {
        Self {
            update_frequency: UpdateFrequency::Daily,
            alerts_enabled: true,
            alert_threshold_ev: DEFAULT_ALERT_THRESHOLD_EV,
            last_update_run: None,
        }
    }
}

/// Partial update. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub update_frequency: Option<UpdateFrequency>,
    pub alerts_enabled: Option<bool>,
    pub alert_threshold_ev: Option<f64>,
}

impl SettingsUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(threshold) = self.alert_threshold_ev {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(ValidationError::OutOfRange {
                    field: "alert_threshold_ev",
                    value: threshold,
                    expected: ">= 0",
                });
            }
        }
        Ok(())
    }

    pub fn apply_to(&self, settings: &mut PortfolioSettings) {
        if let Some(frequency) = self.update_frequency {
            settings.update_frequency = frequency;
        }
        if let Some(enabled) = self.alerts_enabled {
            settings.alerts_enabled = enabled;
        }
        if let Some(threshold) = self.alert_threshold_ev {
            settings.alert_threshold_ev = threshold;
        }
    }
}
