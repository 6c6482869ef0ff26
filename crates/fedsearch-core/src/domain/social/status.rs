//! Status (content item) entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::account::{Account, AccountId};

/// Numeric status identifier, ordered by creation
pub type StatusId = i64;

/// Who may see a status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Unlisted,
    /// Followers only
    Private,
    /// Mentioned accounts only
    Direct,
}

impl Visibility {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Unlisted => "unlisted",
            Self::Private => "private",
            Self::Direct => "direct",
        }
    }

    /// Create from string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "public" => Some(Self::Public),
            "unlisted" => Some(Self::Unlisted),
            "private" => Some(Self::Private),
            "direct" => Some(Self::Direct),
            _ => None,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A status together with its author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub id: StatusId,
    pub account: Account,
    pub text: String,
    pub visibility: Visibility,
    pub mentioned_account_ids: Vec<AccountId>,
    pub created_at: DateTime<Utc>,
}

impl Status {
    pub fn new(id: StatusId, account: Account, text: impl Into<String>) -> Self {
        Self {
            id,
            account,
            text: text.into(),
            visibility: Visibility::Public,
            mentioned_account_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_mentions(mut self, account_ids: Vec<AccountId>) -> Self {
        self.mentioned_account_ids = account_ids;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn account_id(&self) -> AccountId {
        self.account.id
    }

    /// Author's domain, `None` for local authors
    pub fn account_domain(&self) -> Option<&str> {
        self.account.domain.as_deref()
    }

    pub fn mentions(&self, account_id: AccountId) -> bool {
        self.mentioned_account_ids.contains(&account_id)
    }
}
