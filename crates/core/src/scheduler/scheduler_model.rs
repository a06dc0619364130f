use std::fmt;

use crate::alerts::DeliveryReport;
use crate::positions::UpdateFrequency;
use crate::refresh::BatchReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduledJob {
    Refresh(UpdateFrequency),
    AlertSweep,
}

impl ScheduledJob {
    pub const ALL: [ScheduledJob; 4] = [
        ScheduledJob::Refresh(UpdateFrequency::Daily),
        ScheduledJob::Refresh(UpdateFrequency::Weekly),
        ScheduledJob::Refresh(UpdateFrequency::Monthly),
        ScheduledJob::AlertSweep,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScheduledJob::Refresh(UpdateFrequency::Daily) => "daily_refresh",
            ScheduledJob::Refresh(UpdateFrequency::Weekly) => "weekly_refresh",
            ScheduledJob::Refresh(UpdateFrequency::Monthly) => "monthly_refresh",
            ScheduledJob::AlertSweep => "alert_sweep",
        }
    }
}

impl fmt::Display for ScheduledJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running(UpdateFrequency),
}

/// Cron expressions (seconds field first, UTC).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub daily: String,
    pub weekly: String,
    pub monthly: String,
    pub alert_sweep: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            daily: "0 0 0 * * *".to_string(),
            weekly: "0 0 0 * * Mon".to_string(),
            monthly: "0 0 0 1 * *".to_string(),
            alert_sweep: "0 0 * * * *".to_string(),
        }
    }
}

impl ScheduleConfig {
    pub fn expression(&self, job: ScheduledJob) -> &str {
        match job {
            ScheduledJob::Refresh(UpdateFrequency::Daily) => &self.daily,
            ScheduledJob::Refresh(UpdateFrequency::Weekly) => &self.weekly,
            ScheduledJob::Refresh(UpdateFrequency::Monthly) => &self.monthly,
            ScheduledJob::AlertSweep => &self.alert_sweep,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobReport {
    Batch(BatchReport),
    Delivery(DeliveryReport),
}
