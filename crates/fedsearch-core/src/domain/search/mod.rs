//! Search domain module
//!
//! Answers one query against accounts, statuses and hashtags (or resolves
//! a URL to a single resource) and returns a unified `ResultSet`.
//!
//! # Architecture
//!
//! - **Entities**: `SearchType`, `SearchOptions`, `ResultSet`, `Resource`
//! - **Query**: `QueryCompiler` / `CompiledQuery` boundary and `IndexQuery` builder
//! - **Backends**: `AccountSearchBackend`, `StatusSearchBackend`, `TagSearchBackend`
//! - **Filter**: `StatusFilter`, post-fetch visibility rules
//! - **Service**: `SearchService`, classification, eligibility and the
//!   syntax-rejection policy
//!
//! # Example
//!
//! ```ignore
//! use fedsearch_core::domain::search::{SearchOptions, SearchService, SearchType};
//!
//! let options = SearchOptions::new().with_type(SearchType::Statuses).with_offset(20);
//! let results = service.search("\"borrow checker\" from:alice", Some(&viewer), 20, &options).await?;
//! for status in &results.statuses {
//!     println!("{}", status.text);
//! }
//! ```

pub mod backends;
pub mod entity;
pub mod filter;
pub mod query;
pub mod resolver;
pub mod service;
pub mod status_search;

// Re-export main types
pub use backends::{
    AccountSearch, AccountSearchBackend, AccountSearchOptions, IndexClient, TagSearch,
    TagSearchBackend, TagSearchOptions,
};
pub use entity::{ResultSet, Resource, SearchOptions, SearchType, VisibilityScope};
pub use filter::{StatusFilter, VisibilityFilter};
pub use query::{AccountLookup, CompiledQuery, IndexQuery, QueryCompiler, StandardQueryCompiler};
pub use resolver::{NoopResolver, ResourceResolver, is_url_query};
pub use service::{QueryRoute, RejectionTracker, SearchService, SearchSettings};
pub use status_search::StatusSearchBackend;
