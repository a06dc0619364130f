//! Cadence scheduling: cron schedules per tier plus the alert sweep.

mod scheduler_model;
mod scheduler_service;

pub use scheduler_model::{JobReport, ScheduleConfig, ScheduledJob, SchedulerState};
pub use scheduler_service::Scheduler;
