//! Account repository implementation
//!
//! Database operations for accounts.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use crate::Result;
use crate::domain::search::{AccountLookup, AccountSearch, AccountSearchOptions};
use crate::domain::social::{Account, AccountId};
use crate::infrastructure::{escape_like, sql_count};
use crate::storage::Database;

const ACCOUNT_COLUMNS: &str = "id, username, domain, display_name, discoverable, silenced";

/// Account repository for database operations
#[derive(Debug, Clone)]
pub struct SqliteAccountRepository {
    db: Database,
}

impl SqliteAccountRepository {
    /// Create a new account repository
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert or replace an account
    pub async fn insert(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, username, domain, display_name, discoverable, silenced)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                username = excluded.username,
                domain = excluded.domain,
                display_name = excluded.display_name,
                discoverable = excluded.discoverable,
                silenced = excluded.silenced
            "#,
        )
        .bind(account.id)
        .bind(&account.username)
        .bind(&account.domain)
        .bind(&account.display_name)
        .bind(account.discoverable)
        .bind(account.silenced)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    /// Get an account by ID
    pub async fn get(&self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|r| Self::row_to_account(&r)))
    }

    /// Convert a database row to an Account
    pub(crate) fn row_to_account(row: &SqliteRow) -> Account {
        Account {
            id: row.get("id"),
            username: row.get("username"),
            domain: row.get("domain"),
            display_name: row.get("display_name"),
            discoverable: row.get("discoverable"),
            silenced: row.get("silenced"),
        }
    }

    /// Split `@user@domain`, `user@domain` or `user` into its parts
    fn split_acct(query: &str) -> (String, Option<String>) {
        let query = query.trim().trim_start_matches('@').to_lowercase();
        match query.split_once('@') {
            Some((username, domain)) if !domain.is_empty() => {
                (username.to_string(), Some(domain.to_string()))
            }
            Some((username, _)) => (username.to_string(), None),
            None => (query, None),
        }
    }
}

#[async_trait]
impl AccountLookup for SqliteAccountRepository {
    async fn find_by_acct(&self, username: &str, domain: Option<&str>) -> Result<Option<Account>> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts \
             WHERE lower(username) = lower(?) AND COALESCE(lower(domain), '') = lower(?)"
        ))
        .bind(username)
        .bind(domain.unwrap_or(""))
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|r| Self::row_to_account(&r)))
    }
}

#[async_trait]
impl AccountSearch for SqliteAccountRepository {
    async fn search(
        &self,
        query: &str,
        viewer: Option<&Account>,
        limit: u64,
        options: AccountSearchOptions,
    ) -> Result<Vec<Account>> {
        let (username, domain) = Self::split_acct(query);
        if username.is_empty() {
            return Ok(Vec::new());
        }
        if options.following && viewer.is_none() {
            return Ok(Vec::new());
        }

        let prefix = format!("{}%", escape_like(&username));
        let contains = format!("%{}%", escape_like(&username));

        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE ("));
        qb.push("lower(username) LIKE ")
            .push_bind(prefix.clone())
            .push(" ESCAPE '\\' OR lower(display_name) LIKE ")
            .push_bind(contains)
            .push(" ESCAPE '\\')");

        if let Some(domain) = &domain {
            qb.push(" AND lower(domain) LIKE ")
                .push_bind(format!("{}%", escape_like(domain)))
                .push(" ESCAPE '\\'");
        }

        if let Some(viewer) = viewer.filter(|_| options.following) {
            qb.push(" AND id IN (SELECT target_account_id FROM follows WHERE account_id = ")
                .push_bind(viewer.id)
                .push(")");
        }

        // Exact acct first, then username prefix, then display name matches
        qb.push(" ORDER BY CASE WHEN lower(username) = ")
            .push_bind(username.clone())
            .push(" AND COALESCE(lower(domain), '') = ")
            .push_bind(domain.clone().unwrap_or_default())
            .push(" THEN 0 WHEN lower(username) LIKE ")
            .push_bind(prefix)
            .push(" ESCAPE '\\' THEN 1 ELSE 2 END, lower(username), id")
            .push(" LIMIT ")
            .push_bind(sql_count(limit))
            .push(" OFFSET ")
            .push_bind(sql_count(options.offset));

        let rows = qb.build().fetch_all(self.db.pool()).await?;

        tracing::debug!(query, results = rows.len(), "Account search");

        Ok(rows.iter().map(Self::row_to_account).collect())
    }
}
