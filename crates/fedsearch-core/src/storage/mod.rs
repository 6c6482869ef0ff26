//! Storage layer - SQLite
//!
//! Provides database management and migrations for fedsearch.
//!
//! # Architecture
//!
//! - `database`: Connection pool management and initialization
//! - `migrations`: Schema versioning and automatic migration
//!
//! # Usage
//!
//! ```ignore
//! use fedsearch_core::storage::Database;
//!
//! // Create an in-memory database for testing
//! let db = Database::in_memory().await?;
//! ```

pub mod database;
pub mod migrations;

// Re-export commonly used types
pub use database::{Database, DatabaseConfig};
pub use migrations::{CURRENT_VERSION, MigrationStatus, migration_status, run_migrations};
