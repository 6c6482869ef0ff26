//! Search service orchestrating the account, status and hashtag backends
//!
//! Classifies the query, runs every eligible backend and merges their
//! results. A `SyntaxRejection` from one backend is tolerated as long as
//! some other backend call completed; only when every call was rejected
//! is the last rejection returned.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::backends::{AccountSearchBackend, TagSearchBackend};
use super::entity::{ResultSet, SearchOptions, SearchType};
use super::resolver::{ResourceResolver, is_url_query};
use super::status_search::StatusSearchBackend;
use crate::domain::social::Account;
use crate::error::{Error, Result};

/// Deployment settings injected into the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// The status index is deployed and may be queried
    pub index_enabled: bool,
    /// Visibility scope mode for status search
    pub visibility_scope: String,
    /// Upper bound applied to the requested limit
    pub max_limit: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            index_enabled: false,
            visibility_scope: "classic".to_string(),
            max_limit: 40,
        }
    }
}

/// Which path a query takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryRoute {
    /// Resolve the URL to a single resource
    Url,
    /// Run the text backends
    Text,
}

/// Tracks backend outcomes for the syntax-rejection policy
///
/// Outcomes must be recorded in invocation order (accounts, statuses,
/// hashtags) so the retained rejection is the one from the latest backend.
#[derive(Debug, Default)]
pub struct RejectionTracker {
    succeeded: bool,
    last_rejection: Option<Error>,
}

impl RejectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one backend call. Successes yield their value, rejections are
    /// kept aside and yield `None`, any other error is returned as fatal.
    pub fn record<T>(&mut self, outcome: Result<T>) -> Result<Option<T>> {
        match outcome {
            Ok(value) => {
                self.succeeded = true;
                Ok(Some(value))
            }
            Err(e) if e.is_syntax_rejection() => {
                self.last_rejection = Some(e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Fail with the last rejection if no call succeeded
    pub fn finish(self) -> Result<()> {
        match (self.succeeded, self.last_rejection) {
            (false, Some(rejection)) => Err(rejection),
            (_, Some(rejection)) => {
                debug!(error = %rejection, "Tolerating syntax rejection from one backend");
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Unified search across accounts, statuses and hashtags
#[derive(Clone)]
pub struct SearchService {
    settings: SearchSettings,
    resolver: Arc<dyn ResourceResolver>,
    accounts: AccountSearchBackend,
    statuses: StatusSearchBackend,
    hashtags: TagSearchBackend,
}

impl SearchService {
    /// Create a new search service
    pub fn new(
        settings: SearchSettings,
        resolver: Arc<dyn ResourceResolver>,
        accounts: AccountSearchBackend,
        statuses: StatusSearchBackend,
        hashtags: TagSearchBackend,
    ) -> Self {
        Self {
            settings,
            resolver,
            accounts,
            statuses,
            hashtags,
        }
    }

    /// Get the injected settings
    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Decide which path a trimmed, non-empty query takes
    pub fn classify(query: &str, options: &SearchOptions) -> QueryRoute {
        if options.resolve && is_url_query(query) {
            QueryRoute::Url
        } else {
            QueryRoute::Text
        }
    }

    /// Execute a search
    ///
    /// `limit <= 0`, blank queries and a `max_limit` of 0 return an empty
    /// result set without calling any backend.
    pub async fn search(
        &self,
        query: &str,
        viewer: Option<&Account>,
        limit: i64,
        options: &SearchOptions,
    ) -> Result<ResultSet> {
        let mut results = ResultSet::new();

        let query = query.trim();
        if limit <= 0 || query.is_empty() {
            return Ok(results);
        }
        let limit = (limit as u64).min(u64::from(self.settings.max_limit));
        if limit == 0 {
            debug!("search.max_limit is 0, nothing to return");
            return Ok(results);
        }
        let offset = options.effective_offset();

        match Self::classify(query, options) {
            QueryRoute::Url => {
                debug!(query, "Resolving URL query");
                self.resolve_url(query, viewer, offset, options, &mut results)
                    .await?;
            }
            QueryRoute::Text => {
                self.search_backends(query, viewer, limit, offset, options, &mut results)
                    .await?;
            }
        }

        info!(
            query_len = query.len(),
            accounts = results.accounts.len(),
            statuses = results.statuses.len(),
            hashtags = results.hashtags.len(),
            "Search completed"
        );

        Ok(results)
    }

    // ========== Private Helper Methods ==========

    /// URL path: only a first-page search of a matching type is answered
    async fn resolve_url(
        &self,
        query: &str,
        viewer: Option<&Account>,
        offset: u64,
        options: &SearchOptions,
        results: &mut ResultSet,
    ) -> Result<()> {
        if offset > 0 {
            return Ok(());
        }

        let resolved = self
            .resolver
            .resolve(query, viewer)
            .await
            .map_err(|e| match e {
                Error::Resolver(_) => e,
                other => Error::Resolver(other.to_string()),
            })?;
        let Some(resource) = resolved else {
            return Ok(());
        };

        if !options.wants(resource.kind()) {
            debug!(kind = %resource.kind(), "Resolved resource does not match requested type");
            return Ok(());
        }

        results.insert(resource);
        Ok(())
    }

    fn accounts_eligible(options: &SearchOptions) -> bool {
        options.wants(SearchType::Accounts)
    }

    fn statuses_eligible(&self, options: &SearchOptions, viewer: Option<&Account>) -> bool {
        self.settings.index_enabled && options.wants(SearchType::Statuses) && viewer.is_some()
    }

    /// A query with `@` is an account mention, never a hashtag
    fn hashtags_eligible(query: &str, options: &SearchOptions) -> bool {
        options.wants(SearchType::Hashtags) && !query.contains('@')
    }

    /// Text path: run eligible backends concurrently, then apply the
    /// rejection policy once every call has finished
    async fn search_backends(
        &self,
        query: &str,
        viewer: Option<&Account>,
        limit: u64,
        offset: u64,
        options: &SearchOptions,
        results: &mut ResultSet,
    ) -> Result<()> {
        let status_viewer = viewer.filter(|_| self.statuses_eligible(options, viewer));

        debug!(
            accounts = Self::accounts_eligible(options),
            statuses = status_viewer.is_some(),
            hashtags = Self::hashtags_eligible(query, options),
            "Dispatching search backends"
        );

        let (accounts, statuses, hashtags) = tokio::join!(
            async {
                if Self::accounts_eligible(options) {
                    Some(self.accounts.search(query, viewer, limit, offset, options).await)
                } else {
                    None
                }
            },
            async {
                match status_viewer {
                    Some(viewer) => Some(self.statuses.search(query, viewer, limit, offset, options).await),
                    None => None,
                }
            },
            async {
                if Self::hashtags_eligible(query, options) {
                    Some(self.hashtags.search(query, limit, offset, options).await)
                } else {
                    None
                }
            },
        );

        let mut tracker = RejectionTracker::new();
        if let Some(outcome) = accounts {
            if let Some(found) = tracker.record(outcome)? {
                results.accounts = found;
            }
        }
        if let Some(outcome) = statuses {
            if let Some(found) = tracker.record(outcome)? {
                results.statuses = found;
            }
        }
        if let Some(outcome) = hashtags {
            if let Some(found) = tracker.record(outcome)? {
                results.hashtags = found;
            }
        }
        tracker.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_success_swallows_rejection() {
        let mut tracker = RejectionTracker::new();
        assert_eq!(tracker.record(Ok(1)).unwrap(), Some(1));
        assert_eq!(tracker.record::<i32>(Err(Error::syntax("x"))).unwrap(), None);
        assert!(tracker.finish().is_ok());
    }

    #[test]
    fn test_tracker_keeps_last_rejection() {
        let mut tracker = RejectionTracker::new();
        tracker.record::<()>(Err(Error::syntax("first"))).unwrap();
        tracker.record::<()>(Err(Error::syntax("second"))).unwrap();
        let err = tracker.finish().unwrap_err();
        assert!(matches!(err, Error::SyntaxRejection { fragment } if fragment == "second"));
    }

    #[test]
    fn test_tracker_propagates_fatal_errors() {
        let mut tracker = RejectionTracker::new();
        let err = tracker
            .record::<()>(Err(Error::Other("boom".into())))
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_tracker_without_calls_is_ok() {
        assert!(RejectionTracker::new().finish().is_ok());
    }

    #[test]
    fn test_classify() {
        let resolve = SearchOptions::new().with_resolve(true);
        assert_eq!(
            SearchService::classify("https://example.com/@alice", &resolve),
            QueryRoute::Url
        );
        assert_eq!(
            SearchService::classify("https://example.com/@alice", &SearchOptions::new()),
            QueryRoute::Text
        );
        assert_eq!(SearchService::classify("alice", &resolve), QueryRoute::Text);
    }

    #[test]
    fn test_default_settings() {
        let settings = SearchSettings::default();
        assert!(!settings.index_enabled);
        assert_eq!(settings.visibility_scope, "classic");
        assert_eq!(settings.max_limit, 40);
    }
}
