//! SQLite storage implementation for the portfolio settings singleton.

mod model;
mod repository;

pub use model::PortfolioSettingsDB;
pub use repository::SettingsRepository;
