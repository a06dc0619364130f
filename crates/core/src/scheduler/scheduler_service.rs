use chrono::{DateTime, Utc};
use cron::Schedule;
use log::{debug, info};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::scheduler_model::{JobReport, ScheduleConfig, ScheduledJob, SchedulerState};
use crate::alerts::{AlertDeliveryServiceTrait, DeliveryReport};
use crate::errors::{Error, Result};
use crate::positions::UpdateFrequency;
use crate::refresh::{BatchReport, RefreshServiceTrait};

struct ParsedSchedule {
    job: ScheduledJob,
    schedule: Schedule,
}

/// Owns the cadence schedules and serializes refresh batches.
///
/// Timers live with the caller: it asks for [`Scheduler::next_run`], sleeps and
/// calls [`Scheduler::run_job`]. A batch triggered while another runs waits
/// for it to finish.
pub struct Scheduler {
    refresh_service: Arc<dyn RefreshServiceTrait>,
    delivery_service: Arc<dyn AlertDeliveryServiceTrait>,
    schedules: Vec<ParsedSchedule>,
    state: RwLock<SchedulerState>,
    batch_lock: Mutex<()>,
}

impl Scheduler {
    pub fn new(
        refresh_service: Arc<dyn RefreshServiceTrait>,
        delivery_service: Arc<dyn AlertDeliveryServiceTrait>,
        config: &ScheduleConfig,
    ) -> Result<Self> {
        let mut schedules = Vec::with_capacity(ScheduledJob::ALL.len());
        for job in ScheduledJob::ALL {
            let expression = config.expression(job);
            let schedule = Schedule::from_str(expression).map_err(|e| {
                Error::InvalidConfigValue(format!("Invalid {} cron '{}': {}", job, expression, e))
            })?;
            schedules.push(ParsedSchedule { job, schedule });
        }

        Ok(Self {
            refresh_service,
            delivery_service,
            schedules,
            state: RwLock::new(SchedulerState::Idle),
            batch_lock: Mutex::new(()),
        })
    }

    pub fn jobs(&self) -> Vec<ScheduledJob> {
        self.schedules.iter().map(|s| s.job).collect()
    }

    /// First fire time of `job` strictly after `after`.
    pub fn next_run(&self, job: ScheduledJob, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedules
            .iter()
            .find(|s| s.job == job)
            .and_then(|s| s.schedule.after(&after).next())
    }

    pub async fn state(&self) -> SchedulerState {
        *self.state.read().await
    }

    pub async fn run_job(&self, job: ScheduledJob) -> Result<JobReport> {
        match job {
            ScheduledJob::Refresh(tier) => self.run_tier(tier).await.map(JobReport::Batch),
            ScheduledJob::AlertSweep => self.deliver_alerts().await.map(JobReport::Delivery),
        }
    }

    pub async fn run_tier(&self, tier: UpdateFrequency) -> Result<BatchReport> {
        let _guard = self.batch_lock.lock().await;
        *self.state.write().await = SchedulerState::Running(tier);
        info!("Scheduler running {} batch", tier);

        let result = self.refresh_service.refresh_all_due(tier).await;

        *self.state.write().await = SchedulerState::Idle;
        result
    }

    /// Independent of batches: never waits for a running refresh.
    pub async fn deliver_alerts(&self) -> Result<DeliveryReport> {
        debug!("Scheduler running alert sweep");
        self.delivery_service.deliver_pending().await
    }
}
