//! SQLite storage implementation for metric snapshots.

mod model;
mod repository;

pub use model::HistorySnapshotDB;
pub use repository::HistoryRepository;
