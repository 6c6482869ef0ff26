//! Search entity and related types
//!
//! Defines the request and response shapes for unified search.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::social::{Account, AccountId, Status, Tag};
use crate::error::{Error, Result};

/// Kinds of results a search can return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    Accounts,
    Statuses,
    Hashtags,
}

impl SearchType {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accounts => "accounts",
            Self::Statuses => "statuses",
            Self::Hashtags => "hashtags",
        }
    }

    /// Create from string representation
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "accounts" => Ok(Self::Accounts),
            "statuses" => Ok(Self::Statuses),
            "hashtags" => Ok(Self::Hashtags),
            other => Err(Error::InvalidInput(format!(
                "Unknown search type '{}'. Expected accounts, statuses or hashtags",
                other
            ))),
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which non-owned statuses may appear in status search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityScope {
    /// Only statuses the viewer could already search
    Classic,
    /// Plus public statuses by discoverable, non-silenced authors
    Discoverable,
    /// Plus all public statuses
    Public,
    /// Plus public and unlisted statuses
    PublicOrUnlisted,
}

impl VisibilityScope {
    pub const NAMES: [&'static str; 4] = ["classic", "discoverable", "public", "public_or_unlisted"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Discoverable => "discoverable",
            Self::Public => "public",
            Self::PublicOrUnlisted => "public_or_unlisted",
        }
    }

    /// Parse a configured mode; unknown modes are a deployment error
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "classic" => Ok(Self::Classic),
            "discoverable" => Ok(Self::Discoverable),
            "public" => Ok(Self::Public),
            "public_or_unlisted" => Ok(Self::PublicOrUnlisted),
            other => Err(Error::Configuration(format!(
                "Unknown search visibility scope '{}'. Valid options: {}",
                other,
                Self::NAMES.join(", ")
            ))),
        }
    }
}

/// Options recognized by `SearchService::search`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Restrict to one result kind
    pub search_type: Option<SearchType>,
    /// Attempt remote resolution of URL-shaped queries
    pub resolve: bool,
    /// Only honoured when `search_type` is set
    pub offset: u64,
    /// Only statuses by this account
    pub account_id: Option<AccountId>,
    /// Exclusive lower status id bound
    pub min_id: Option<i64>,
    /// Exclusive upper status id bound
    pub max_id: Option<i64>,
    /// Only reviewed hashtags
    pub exclude_unreviewed: bool,
    /// Only accounts the viewer follows
    pub following: bool,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, search_type: SearchType) -> Self {
        self.search_type = Some(search_type);
        self
    }

    pub fn with_resolve(mut self, resolve: bool) -> Self {
        self.resolve = resolve;
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_account_id(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn with_min_id(mut self, min_id: i64) -> Self {
        self.min_id = Some(min_id);
        self
    }

    pub fn with_max_id(mut self, max_id: i64) -> Self {
        self.max_id = Some(max_id);
        self
    }

    pub fn exclude_unreviewed(mut self, exclude: bool) -> Self {
        self.exclude_unreviewed = exclude;
        self
    }

    pub fn following(mut self, following: bool) -> Self {
        self.following = following;
        self
    }

    /// Pagination offset in effect: zero unless a single type was requested
    pub fn effective_offset(&self) -> u64 {
        if self.search_type.is_some() {
            self.offset
        } else {
            0
        }
    }

    /// Whether results of `kind` were requested
    pub fn wants(&self, kind: SearchType) -> bool {
        self.search_type.is_none_or(|t| t == kind)
    }
}

/// A concrete local representation of a resolved URL
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Account(Account),
    Status(Status),
    Tag(Tag),
}

impl Resource {
    pub fn kind(&self) -> SearchType {
        match self {
            Self::Account(_) => SearchType::Accounts,
            Self::Status(_) => SearchType::Statuses,
            Self::Tag(_) => SearchType::Hashtags,
        }
    }
}

/// Unified search results, always carrying all three kinds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub accounts: Vec<Account>,
    pub statuses: Vec<Status>,
    pub hashtags: Vec<Tag>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty() && self.statuses.is_empty() && self.hashtags.is_empty()
    }

    /// Total number of results across kinds
    pub fn len(&self) -> usize {
        self.accounts.len() + self.statuses.len() + self.hashtags.len()
    }

    /// Append a resource under its kind
    pub fn insert(&mut self, resource: Resource) {
        match resource {
            Resource::Account(account) => self.accounts.push(account),
            Resource::Status(status) => self.statuses.push(status),
            Resource::Tag(tag) => self.hashtags.push(tag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_type_parse() {
        assert_eq!(SearchType::parse("Accounts").unwrap(), SearchType::Accounts);
        assert_eq!(SearchType::parse(" hashtags ").unwrap(), SearchType::Hashtags);
        let err = SearchType::parse("people").unwrap_err();
        assert_eq!(err.code(), "E800");
    }

    #[test]
    fn test_visibility_scope_parse() {
        for name in VisibilityScope::NAMES {
            assert_eq!(VisibilityScope::parse(name).unwrap().as_str(), name);
        }
        let err = VisibilityScope::parse("everything").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_effective_offset_requires_type() {
        let options = SearchOptions::new().with_offset(20);
        assert_eq!(options.effective_offset(), 0);
        let options = options.with_type(SearchType::Statuses);
        assert_eq!(options.effective_offset(), 20);
    }

    #[test]
    fn test_wants() {
        let any = SearchOptions::new();
        assert!(any.wants(SearchType::Accounts));
        assert!(any.wants(SearchType::Hashtags));

        let accounts = SearchOptions::new().with_type(SearchType::Accounts);
        assert!(accounts.wants(SearchType::Accounts));
        assert!(!accounts.wants(SearchType::Statuses));
    }

    #[test]
    fn test_result_set_always_has_three_keys() {
        let json = serde_json::to_value(ResultSet::new()).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 3);
        assert!(json["accounts"].as_array().unwrap().is_empty());
        assert!(json["statuses"].as_array().unwrap().is_empty());
        assert!(json["hashtags"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_insert_routes_by_kind() {
        let mut results = ResultSet::new();
        let tag = Tag::new(1, "rust");
        assert_eq!(Resource::Tag(tag.clone()).kind(), SearchType::Hashtags);
        results.insert(Resource::Tag(tag.clone()));
        results.insert(Resource::Account(Account::local(2, "alice")));
        assert_eq!(results.hashtags, vec![tag]);
        assert_eq!(results.accounts.len(), 1);
        assert_eq!(results.len(), 2);
        assert!(!results.is_empty());
    }
}
