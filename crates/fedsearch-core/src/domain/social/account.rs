//! Account entity

use serde::{Deserialize, Serialize};

/// Numeric account identifier
pub type AccountId = i64;

/// A local or remote account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    /// `None` for local accounts
    pub domain: Option<String>,
    pub display_name: String,
    /// Opted in to appearing in discovery surfaces
    pub discoverable: bool,
    /// Limited by moderators
    pub silenced: bool,
}

impl Account {
    /// Create a local account
    pub fn local(id: AccountId, username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            id,
            display_name: username.clone(),
            username,
            domain: None,
            discoverable: false,
            silenced: false,
        }
    }

    /// Create a remote account on `domain`
    pub fn remote(id: AccountId, username: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            domain: Some(domain.into().to_lowercase()),
            ..Self::local(id, username)
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn discoverable(mut self, discoverable: bool) -> Self {
        self.discoverable = discoverable;
        self
    }

    pub fn silenced(mut self, silenced: bool) -> Self {
        self.silenced = silenced;
        self
    }

    pub fn is_local(&self) -> bool {
        self.domain.is_none()
    }

    /// `username` for local accounts, `username@domain` for remote ones
    pub fn acct(&self) -> String {
        match &self.domain {
            Some(domain) => format!("{}@{}", self.username, domain),
            None => self.username.clone(),
        }
    }
}
