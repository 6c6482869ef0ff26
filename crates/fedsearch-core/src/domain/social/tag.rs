//! Hashtag entity

use serde::{Deserialize, Serialize};

/// Numeric tag identifier
pub type TagId = i64;

/// A hashtag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    /// Stored without the leading `#`
    pub name: String,
    /// Approved by moderators for trends
    pub reviewed: bool,
    /// Allowed to appear in search and directories
    pub listable: bool,
}

impl Tag {
    pub fn new(id: TagId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            reviewed: false,
            listable: true,
        }
    }

    pub fn reviewed(mut self, reviewed: bool) -> Self {
        self.reviewed = reviewed;
        self
    }

    pub fn listable(mut self, listable: bool) -> Self {
        self.listable = listable;
        self
    }

    /// Normalize user input into a tag name, `None` if it is not a valid hashtag
    pub fn normalize(input: &str) -> Option<String> {
        let name = input.trim().trim_start_matches('#');
        if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return None;
        }
        if name.chars().all(|c| c.is_ascii_digit() || c == '_') {
            return None;
        }
        Some(name.to_lowercase())
    }
}
