//! Background timers for the refresh cadences and the alert sweep.
//!
//! One task per scheduled job. Each task asks the core scheduler for its next
//! fire time, sleeps until then and runs the job.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

use assessapp_core::scheduler::{JobReport, ScheduledJob, Scheduler};

/// Starts one timer loop per job and returns their handles.
pub fn start_scheduler(scheduler: Arc<Scheduler>) -> Vec<JoinHandle<()>> {
    scheduler
        .jobs()
        .into_iter()
        .map(|job| {
            let scheduler = scheduler.clone();
            tokio::spawn(async move { run_loop(scheduler, job).await })
        })
        .collect()
}

async fn run_loop(scheduler: Arc<Scheduler>, job: ScheduledJob) {
    info!("Scheduler started for {}", job);
    loop {
        let now = Utc::now();
        let Some(next) = scheduler.next_run(job, now) else {
            warn!("No upcoming run for {}, stopping its timer", job);
            return;
        };
        debug!("Next {} at {}", job, next);
        tokio::time::sleep(delay_until(now, next)).await;

        match scheduler.run_job(job).await {
            Ok(report) => log_report(job, &report),
            Err(e) => error!("Scheduled {} failed: {}", job, e),
        }
    }
}

fn delay_until(now: DateTime<Utc>, next: DateTime<Utc>) -> Duration {
    (next - now).to_std().unwrap_or(Duration::ZERO)
}

fn log_report(job: ScheduledJob, report: &JobReport) {
    match report {
        JobReport::Batch(batch) => info!(
            "Scheduled {} completed: {}/{} refreshed, {} errors",
            job, batch.updated, batch.total, batch.errors
        ),
        JobReport::Delivery(delivery) if delivery.sent == 0 && delivery.failed == 0 => {
            debug!("Scheduled {}: nothing to deliver", job)
        }
        JobReport::Delivery(delivery) => info!(
            "Scheduled {} completed: {} sent, {} failed",
            job, delivery.sent, delivery.failed
        ),
    }
}
