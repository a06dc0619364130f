//! SQLite storage implementation for the alert queue.

mod model;
mod repository;

pub use model::AlertDB;
pub use repository::AlertRepository;
