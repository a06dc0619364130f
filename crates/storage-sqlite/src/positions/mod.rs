//! SQLite storage implementation for positions.

mod model;
mod repository;

pub use model::PositionDB;
pub(crate) use model::parse_assessment;
pub use repository::PositionRepository;
