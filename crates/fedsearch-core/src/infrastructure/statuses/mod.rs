//! Status infrastructure module
//!
//! Database repository for statuses and the SQLite-backed status index.

pub mod index;
pub mod repository;

pub use index::SqliteStatusIndex;
pub use repository::SqliteStatusRepository;
