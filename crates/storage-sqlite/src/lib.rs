//! SQLite storage implementation for the assessment engine.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `assessapp-core` and contains:
//! - Database connection pooling and the single-writer actor
//! - Diesel migrations
//! - Repository implementations for positions, history, alerts, settings and FX rates
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! `core` is database-agnostic and works with traits.
//!
//! ```text
//!      core (domain, traits)
//!               │
//!               ▼
//!    storage-sqlite (this crate)
//!               │
//!               ▼
//!           SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
mod utils;

// Repository implementations
pub mod alerts;
pub mod fx;
pub mod history;
pub mod positions;
pub mod settings;

#[cfg(test)]
mod test_support;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

pub use alerts::AlertRepository;
pub use fx::FxRepository;
pub use history::HistoryRepository;
pub use positions::PositionRepository;
pub use settings::SettingsRepository;

pub use errors::StorageError;

// Re-export from assessapp-core for convenience
pub use assessapp_core::errors::{DatabaseError, Error, Result};
