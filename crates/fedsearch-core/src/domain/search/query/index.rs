//! Index query builder
//!
//! A small boolean query tree in the shape search indexes accept. Compiled
//! query ASTs and the status backend both write into it; index clients
//! translate it into their own dialect.

use serde::Serialize;

use crate::domain::social::{AccountId, Visibility};

/// Fields of an indexed status document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexField {
    Id,
    AccountId,
    /// Accounts allowed to find the status regardless of visibility scope
    SearchableBy,
    Visibility,
    /// Author is discoverable
    Discoverable,
    /// Author is silenced
    Silenced,
    /// Unix seconds
    CreatedAt,
}

/// A literal compared against a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Bool(bool),
    Text(String),
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Visibility> for FieldValue {
    fn from(value: Visibility) -> Self {
        Self::Text(value.as_str().to_string())
    }
}

/// Numeric range bounds; all optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RangeBounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<i64>,
}

impl RangeBounds {
    /// Exclusive on both ends
    pub fn exclusive(gt: Option<i64>, lt: Option<i64>) -> Self {
        Self {
            gt,
            lt,
            ..Default::default()
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.gt.is_none() && self.gte.is_none() && self.lt.is_none() && self.lte.is_none()
    }

    pub fn contains(&self, value: i64) -> bool {
        self.gt.is_none_or(|b| value > b)
            && self.gte.is_none_or(|b| value >= b)
            && self.lt.is_none_or(|b| value < b)
            && self.lte.is_none_or(|b| value <= b)
    }
}

/// One node of the query tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Clause {
    Term { field: IndexField, value: FieldValue },
    Terms { field: IndexField, values: Vec<FieldValue> },
    /// All words must appear in the text
    Match { text: String },
    /// The exact phrase must appear in the text
    Phrase { text: String },
    Range { field: IndexField, bounds: RangeBounds },
    Bool(BoolQuery),
}

impl Clause {
    pub fn term(field: IndexField, value: impl Into<FieldValue>) -> Self {
        Self::Term {
            field,
            value: value.into(),
        }
    }

    pub fn terms<V: Into<FieldValue>>(field: IndexField, values: impl IntoIterator<Item = V>) -> Self {
        Self::Terms {
            field,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn range(field: IndexField, bounds: RangeBounds) -> Self {
        Self::Range { field, bounds }
    }
}

/// Boolean combination of clauses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoolQuery {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<Clause>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<Clause>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<Clause>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub must_not: Vec<Clause>,
    /// Minimum number of `should` clauses that must hold; 0 makes them optional
    pub minimum_should_match: u32,
}

impl BoolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// At least one of `clauses` must hold
    pub fn any_of(clauses: Vec<Clause>) -> Self {
        Self {
            should: clauses,
            minimum_should_match: 1,
            ..Default::default()
        }
    }

    /// Every one of `clauses` must hold, without contributing to scoring
    pub fn all_of(clauses: Vec<Clause>) -> Self {
        Self {
            filter: clauses,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty()
            && self.filter.is_empty()
            && self.should.is_empty()
            && self.must_not.is_empty()
    }
}

/// Root of a status index query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexQuery {
    pub root: BoolQuery,
}

impl IndexQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, clause: Clause) -> Self {
        self.root.must.push(clause);
        self
    }

    pub fn filter(mut self, clause: Clause) -> Self {
        self.root.filter.push(clause);
        self
    }

    pub fn must_not(mut self, clause: Clause) -> Self {
        self.root.must_not.push(clause);
        self
    }

    /// Compact JSON form for logs
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "<unserializable query>".to_string())
    }
}
