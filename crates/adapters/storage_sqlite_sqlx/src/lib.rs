//! # switchyard-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `ActionRepository` port defined in `switchyard-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `switchyard-app` (for port traits) and `switchyard-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod action_repo;
mod error;
mod pool;

pub use action_repo::SqliteActionRepository;
pub use error::StorageError;
pub use pool::{Config, Database};
