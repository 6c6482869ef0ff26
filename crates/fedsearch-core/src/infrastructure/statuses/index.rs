//! SQLite status index
//!
//! Stores one denormalised document per status in `status_index` and
//! answers `IndexQuery` trees by translating them into SQL. Index entries
//! are written separately from `statuses`, so a hit can point at a status
//! that has since been deleted.

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};
use std::collections::{BTreeSet, HashMap};

use super::repository::SqliteStatusRepository;
use crate::domain::search::IndexClient;
use crate::domain::search::query::{BoolQuery, Clause, FieldValue, IndexField, IndexQuery, RangeBounds};
use crate::domain::social::{AccountId, Status, StatusId};
use crate::error::{Error, Result};
use crate::infrastructure::{escape_like, sql_count};
use crate::storage::Database;

/// SQLite-backed implementation of `IndexClient`
#[derive(Debug, Clone)]
pub struct SqliteStatusIndex {
    db: Database,
    statuses: SqliteStatusRepository,
}

impl SqliteStatusIndex {
    /// Create a new status index over `db`
    pub fn new(db: Database) -> Self {
        Self {
            statuses: SqliteStatusRepository::new(db.clone()),
            db,
        }
    }

    /// Write or replace the index document for `status`
    ///
    /// The author and every mentioned account can always find the status;
    /// `extra_searchable_by` adds further accounts (e.g. those who
    /// favourited or boosted it).
    pub async fn index_status(&self, status: &Status, extra_searchable_by: &[AccountId]) -> Result<()> {
        let searchable_by: BTreeSet<AccountId> = std::iter::once(status.account_id())
            .chain(status.mentioned_account_ids.iter().copied())
            .chain(extra_searchable_by.iter().copied())
            .collect();

        let mut tx = self.db.pool().begin().await?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO status_index
                (id, account_id, text, visibility, discoverable, silenced, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(status.id)
        .bind(status.account_id())
        .bind(&status.text)
        .bind(status.visibility.as_str())
        .bind(status.account.discoverable)
        .bind(status.account.silenced)
        .bind(status.created_at.timestamp())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM status_index_searchable_by WHERE status_id = ?")
            .bind(status.id)
            .execute(&mut *tx)
            .await?;

        for account_id in searchable_by {
            sqlx::query("INSERT INTO status_index_searchable_by (status_id, account_id) VALUES (?, ?)")
                .bind(status.id)
                .bind(account_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::debug!(status_id = status.id, "Indexed status");
        Ok(())
    }

    /// Remove a status from the index
    pub async fn remove(&self, id: StatusId) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;
        sqlx::query("DELETE FROM status_index_searchable_by WHERE status_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM status_index WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Matching ids, newest first
    async fn matching_ids(&self, query: &IndexQuery, limit: u64, offset: u64) -> Result<Vec<StatusId>> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("SELECT si.id FROM status_index si WHERE ");
        push_bool(&mut qb, &query.root);
        qb.push(" ORDER BY si.created_at DESC, si.id DESC LIMIT ")
            .push_bind(sql_count(limit))
            .push(" OFFSET ")
            .push_bind(sql_count(offset));

        let rows: Vec<(StatusId,)> = qb.build_query_as().fetch_all(self.db.pool()).await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn run(&self, query: &IndexQuery, limit: u64, offset: u64) -> Result<Vec<Option<Status>>> {
        let ids = self.matching_ids(query, limit, offset).await?;
        let mut loaded: HashMap<StatusId, Status> = self
            .statuses
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|status| (status.id, status))
            .collect();

        Ok(ids.iter().map(|id| loaded.remove(id)).collect())
    }
}

#[async_trait]
impl IndexClient for SqliteStatusIndex {
    async fn execute(&self, query: &IndexQuery, limit: u64, offset: u64) -> Result<Vec<Option<Status>>> {
        tracing::debug!(query = %query.to_json(), limit, offset, "Querying status index");

        self.run(query, limit, offset)
            .await
            .map_err(|e| Error::DownstreamUnavailable(format!("status index: {}", e)))
    }
}

/// Column holding `field`; `SearchableBy` lives in its own table
fn column(field: IndexField) -> &'static str {
    match field {
        IndexField::Id => "si.id",
        IndexField::AccountId => "si.account_id",
        IndexField::SearchableBy => "sb.account_id",
        IndexField::Visibility => "si.visibility",
        IndexField::Discoverable => "si.discoverable",
        IndexField::Silenced => "si.silenced",
        IndexField::CreatedAt => "si.created_at",
    }
}

/// Wrap a predicate on `field` so that multi-valued fields are matched
/// through their side table
fn push_field_predicate(
    qb: &mut QueryBuilder<'_, Sqlite>,
    field: IndexField,
    predicate: impl FnOnce(&mut QueryBuilder<'_, Sqlite>, &'static str),
) {
    if field == IndexField::SearchableBy {
        qb.push("EXISTS (SELECT 1 FROM status_index_searchable_by sb WHERE sb.status_id = si.id AND ");
        predicate(qb, column(field));
        qb.push(")");
    } else {
        predicate(qb, column(field));
    }
}

fn push_value(qb: &mut QueryBuilder<'_, Sqlite>, value: &FieldValue) {
    match value {
        FieldValue::Int(v) => qb.push_bind(*v),
        FieldValue::Bool(v) => qb.push_bind(*v),
        FieldValue::Text(v) => qb.push_bind(v.clone()),
    };
}

fn push_like(qb: &mut QueryBuilder<'_, Sqlite>, needle: &str) {
    qb.push("lower(si.text) LIKE ")
        .push_bind(format!("%{}%", escape_like(&needle.to_lowercase())))
        .push(" ESCAPE '\\'");
}

fn push_range(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, bounds: &RangeBounds) {
    let parts = [
        (bounds.gt, ">"),
        (bounds.gte, ">="),
        (bounds.lt, "<"),
        (bounds.lte, "<="),
    ];
    let mut first = true;
    qb.push("(");
    for (bound, op) in parts {
        let Some(bound) = bound else { continue };
        if !first {
            qb.push(" AND ");
        }
        first = false;
        qb.push(format!("{column} {op} ")).push_bind(bound);
    }
    if first {
        qb.push("1");
    }
    qb.push(")");
}

fn push_clause(qb: &mut QueryBuilder<'_, Sqlite>, clause: &Clause) {
    match clause {
        Clause::Term { field, value } => push_field_predicate(qb, *field, |qb, col| {
            qb.push(format!("{col} = "));
            push_value(qb, value);
        }),
        Clause::Terms { values, .. } if values.is_empty() => {
            qb.push("0");
        }
        Clause::Terms { field, values } => push_field_predicate(qb, *field, |qb, col| {
            qb.push(format!("{col} IN ("));
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    qb.push(", ");
                }
                push_value(qb, value);
            }
            qb.push(")");
        }),
        Clause::Match { text } => {
            let words: Vec<&str> = text.split_whitespace().collect();
            if words.is_empty() {
                qb.push("1");
                return;
            }
            qb.push("(");
            for (i, word) in words.iter().enumerate() {
                if i > 0 {
                    qb.push(" AND ");
                }
                push_like(qb, word);
            }
            qb.push(")");
        }
        Clause::Phrase { text } => push_like(qb, text),
        Clause::Range { field, bounds } => {
            push_field_predicate(qb, *field, |qb, col| push_range(qb, col, bounds))
        }
        Clause::Bool(inner) => push_bool(qb, inner),
    }
}

/// Push the " AND " separating conjuncts
fn conjunct(qb: &mut QueryBuilder<'_, Sqlite>, first: &mut bool) {
    if !*first {
        qb.push(" AND ");
    }
    *first = false;
}

fn push_bool(qb: &mut QueryBuilder<'_, Sqlite>, query: &BoolQuery) {
    let mut first = true;

    qb.push("(");
    for clause in query.must.iter().chain(&query.filter) {
        conjunct(qb, &mut first);
        push_clause(qb, clause);
    }
    for clause in &query.must_not {
        conjunct(qb, &mut first);
        qb.push("NOT ");
        push_clause(qb, clause);
    }
    if query.minimum_should_match > 0 {
        conjunct(qb, &mut first);
        if query.should.is_empty() {
            qb.push("0");
        } else {
            qb.push("(");
            for (i, clause) in query.should.iter().enumerate() {
                if i > 0 {
                    qb.push(" + ");
                }
                qb.push("(CASE WHEN ");
                push_clause(qb, clause);
                qb.push(" THEN 1 ELSE 0 END)");
            }
            qb.push(format!(") >= {}", query.minimum_should_match));
        }
    }
    if first {
        qb.push("1");
    }
    qb.push(")");
}
