//! Query compilation
//!
//! `QueryCompiler` turns free text into a `CompiledQuery`, the capability
//! the status backend needs: which accounts must be checked for blocks
//! before searching, and how to write the query into an `IndexQuery`.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Debug;
use std::sync::Arc;

use super::index::{Clause, IndexField, IndexQuery, RangeBounds};
use super::parser::{QueryParser, Token, TokenKind};
use crate::domain::social::{Account, AccountId, Visibility};
use crate::error::{Error, Result};

/// Compiled form of a free-text query
pub trait CompiledQuery: Send + Sync + Debug {
    /// Accounts that must not be blocking the viewer for the search to run
    fn required_blocker_ids(&self) -> Vec<AccountId>;

    /// Write this query's clauses into `query`
    fn apply_to(
        &self,
        query: IndexQuery,
        viewer_id: AccountId,
        following_ids: &[AccountId],
    ) -> IndexQuery;
}

/// Parses query text into a `CompiledQuery`
#[async_trait]
pub trait QueryCompiler: Send + Sync {
    /// Fails with `SyntaxRejection` on invalid syntax and with
    /// `DownstreamUnavailable` when a lookup dependency cannot be reached
    async fn compile(&self, query: &str) -> Result<Box<dyn CompiledQuery>>;
}

/// Account lookup used to resolve `from:` operators
#[async_trait]
pub trait AccountLookup: Send + Sync {
    async fn find_by_acct(&self, username: &str, domain: Option<&str>) -> Result<Option<Account>>;
}

/// Who a `from:` operator refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    Viewer,
    Account(AccountId),
}

/// One interpreted query term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Text(String),
    Phrase(String),
    From(Author),
    CreatedAt(RangeBounds),
    InLibrary,
    InPublic,
    InFollowing,
}

/// A term and whether it excludes matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTerm {
    pub negated: bool,
    pub term: Term,
}

/// AST produced by `StandardQueryCompiler`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandardQuery {
    pub terms: Vec<QueryTerm>,
}

impl StandardQuery {
    fn clause(term: &Term, viewer_id: AccountId, following_ids: &[AccountId]) -> Clause {
        match term {
            Term::Text(text) => Clause::Match { text: text.clone() },
            Term::Phrase(text) => Clause::Phrase { text: text.clone() },
            Term::From(Author::Viewer) => Clause::term(IndexField::AccountId, viewer_id),
            Term::From(Author::Account(id)) => Clause::term(IndexField::AccountId, *id),
            Term::CreatedAt(bounds) => Clause::range(IndexField::CreatedAt, bounds.clone()),
            Term::InLibrary => Clause::term(IndexField::SearchableBy, viewer_id),
            Term::InPublic => Clause::term(IndexField::Visibility, Visibility::Public),
            Term::InFollowing => Clause::terms(IndexField::AccountId, following_ids.iter().copied()),
        }
    }
}

impl CompiledQuery for StandardQuery {
    fn required_blocker_ids(&self) -> Vec<AccountId> {
        let mut ids: Vec<AccountId> = self
            .terms
            .iter()
            .filter(|t| !t.negated)
            .filter_map(|t| match t.term {
                Term::From(Author::Account(id)) => Some(id),
                _ => None,
            })
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    fn apply_to(
        &self,
        mut query: IndexQuery,
        viewer_id: AccountId,
        following_ids: &[AccountId],
    ) -> IndexQuery {
        for QueryTerm { negated, term } in &self.terms {
            let clause = Self::clause(term, viewer_id, following_ids);
            query = match (*negated, term) {
                (true, _) => query.must_not(clause),
                (false, Term::Text(_) | Term::Phrase(_)) => query.must(clause),
                (false, _) => query.filter(clause),
            };
        }
        query
    }
}

/// Default compiler for the search query language
///
/// Supports words, quoted phrases, `-` negation and the operators
/// `from:`, `before:`, `after:`, `during:` and `in:`.
#[derive(Clone)]
pub struct StandardQueryCompiler {
    parser: Arc<QueryParser>,
    accounts: Arc<dyn AccountLookup>,
}

impl StandardQueryCompiler {
    pub fn new(accounts: Arc<dyn AccountLookup>) -> Self {
        Self {
            parser: Arc::new(QueryParser::new()),
            accounts,
        }
    }

    /// Interpret one token; `None` for operators that add no constraint
    async fn interpret(&self, token: Token) -> Result<Option<QueryTerm>> {
        let term = match token.kind {
            TokenKind::Word(word) => Term::Text(word),
            TokenKind::Phrase(phrase) => Term::Phrase(phrase),
            TokenKind::Operator { prefix, value } => {
                let fragment = format!("{}:{}", prefix, value);
                match prefix.as_str() {
                    "from" => Term::From(self.author(&value, &fragment).await?),
                    "before" => Term::CreatedAt(RangeBounds {
                        lt: Some(day_start(&value, &fragment)?),
                        ..Default::default()
                    }),
                    "after" => Term::CreatedAt(RangeBounds {
                        gte: Some(next_day_start(&value, &fragment)?),
                        ..Default::default()
                    }),
                    "during" => Term::CreatedAt(RangeBounds {
                        gte: Some(day_start(&value, &fragment)?),
                        lt: Some(next_day_start(&value, &fragment)?),
                        ..Default::default()
                    }),
                    "in" => match value.to_lowercase().as_str() {
                        "library" => Term::InLibrary,
                        "public" => Term::InPublic,
                        "following" => Term::InFollowing,
                        "all" => return Ok(None),
                        _ => return Err(Error::syntax(fragment)),
                    },
                    _ => Term::Text(fragment),
                }
            }
        };

        Ok(Some(QueryTerm {
            negated: token.negated,
            term,
        }))
    }

    async fn author(&self, value: &str, fragment: &str) -> Result<Author> {
        let acct = value.trim_start_matches('@');
        if acct.eq_ignore_ascii_case("me") {
            return Ok(Author::Viewer);
        }

        let (username, domain) = match acct.split_once('@') {
            Some((username, domain)) => (username, Some(domain)),
            None => (acct, None),
        };
        if username.is_empty() || domain.is_some_and(str::is_empty) {
            return Err(Error::syntax(fragment));
        }

        let account = self
            .accounts
            .find_by_acct(username, domain)
            .await
            .map_err(|e| {
                if e.is_downstream_unavailable() {
                    e
                } else {
                    Error::DownstreamUnavailable(e.to_string())
                }
            })?;

        account
            .map(|a| Author::Account(a.id))
            .ok_or_else(|| Error::syntax(fragment))
    }
}

#[async_trait]
impl QueryCompiler for StandardQueryCompiler {
    async fn compile(&self, query: &str) -> Result<Box<dyn CompiledQuery>> {
        let tokens = self.parser.parse(query)?;
        let mut terms = Vec::with_capacity(tokens.len());
        for token in tokens {
            if let Some(term) = self.interpret(token).await? {
                terms.push(term);
            }
        }
        Ok(Box::new(StandardQuery { terms }))
    }
}

fn parse_date(value: &str, fragment: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| Error::syntax(fragment))
}

fn midnight_utc(date: NaiveDate, fragment: &str) -> Result<i64> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| Error::syntax(fragment))
}

/// Unix seconds at 00:00 UTC of `value`
fn day_start(value: &str, fragment: &str) -> Result<i64> {
    midnight_utc(parse_date(value, fragment)?, fragment)
}

/// Unix seconds at 00:00 UTC of the day after `value`
fn next_day_start(value: &str, fragment: &str) -> Result<i64> {
    let next = parse_date(value, fragment)?
        .succ_opt()
        .ok_or_else(|| Error::syntax(fragment))?;
    midnight_utc(next, fragment)
}
