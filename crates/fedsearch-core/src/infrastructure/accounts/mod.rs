//! Account infrastructure module
//!
//! Database repository for accounts, used for `from:` lookups and account search.

pub mod repository;

pub use repository::SqliteAccountRepository;
