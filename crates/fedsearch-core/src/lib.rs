//! fedsearch Core Library
//!
//! This crate provides unified search for a federated social server:
//! - Search orchestration across accounts, statuses and hashtags
//! - URL resolution to a single resource
//! - Query language compilation into index queries
//! - Relationship lookups and post-fetch visibility filtering
//! - Storage (SQLite) and SQLite-backed collaborator implementations
//! - File-backed configuration

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod storage;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::search::{ResultSet, SearchOptions, SearchService, SearchType};
    pub use crate::domain::social::{Account, Status, Tag, Visibility};
    pub use crate::error::{Error, Result};
}
