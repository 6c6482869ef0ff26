//! Search backend collaborators and the account/hashtag backends
//!
//! Account and hashtag search are thin delegations: they translate
//! `SearchOptions` into the collaborator's options and pass any
//! `SyntaxRejection` through untouched.

use async_trait::async_trait;
use std::sync::Arc;

use super::entity::SearchOptions;
use super::query::IndexQuery;
use crate::domain::social::{Account, Status, Tag};
use crate::error::Result;

/// Options understood by account search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountSearchOptions {
    pub offset: u64,
    /// Allow the collaborator to look up unknown remote accounts
    pub resolve: bool,
    /// Only accounts the viewer follows
    pub following: bool,
}

/// Options understood by hashtag search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagSearchOptions {
    pub offset: u64,
    pub exclude_unreviewed: bool,
}

/// Account directory search
#[async_trait]
pub trait AccountSearch: Send + Sync {
    async fn search(
        &self,
        query: &str,
        viewer: Option<&Account>,
        limit: u64,
        options: AccountSearchOptions,
    ) -> Result<Vec<Account>>;
}

/// Hashtag search
#[async_trait]
pub trait TagSearch: Send + Sync {
    async fn search(&self, query: &str, limit: u64, options: TagSearchOptions) -> Result<Vec<Tag>>;
}

/// Status search index client
///
/// Returns hits in relevance order. A `None` hit is an index entry whose
/// backing status no longer exists. Connectivity failures and timeouts are
/// reported as `DownstreamUnavailable`.
#[async_trait]
pub trait IndexClient: Send + Sync {
    async fn execute(&self, query: &IndexQuery, limit: u64, offset: u64) -> Result<Vec<Option<Status>>>;
}

/// Account search backend
#[derive(Clone)]
pub struct AccountSearchBackend {
    search: Arc<dyn AccountSearch>,
}

impl AccountSearchBackend {
    pub fn new(search: Arc<dyn AccountSearch>) -> Self {
        Self { search }
    }

    pub async fn search(
        &self,
        query: &str,
        viewer: Option<&Account>,
        limit: u64,
        offset: u64,
        options: &SearchOptions,
    ) -> Result<Vec<Account>> {
        let options = AccountSearchOptions {
            offset,
            resolve: options.resolve,
            following: options.following,
        };
        self.search.search(query, viewer, limit, options).await
    }
}

/// Hashtag search backend
#[derive(Clone)]
pub struct TagSearchBackend {
    search: Arc<dyn TagSearch>,
}

impl TagSearchBackend {
    pub fn new(search: Arc<dyn TagSearch>) -> Self {
        Self { search }
    }

    pub async fn search(
        &self,
        query: &str,
        limit: u64,
        offset: u64,
        options: &SearchOptions,
    ) -> Result<Vec<Tag>> {
        let options = TagSearchOptions {
            offset,
            exclude_unreviewed: options.exclude_unreviewed,
        };
        self.search.search(query, limit, options).await
    }
}
