//! History - immutable metric snapshots appended after each refresh.

mod history_model;
mod history_service;
mod history_traits;

pub use history_model::HistorySnapshot;
pub use history_service::HistoryRecorder;
pub use history_traits::HistoryRepositoryTrait;
