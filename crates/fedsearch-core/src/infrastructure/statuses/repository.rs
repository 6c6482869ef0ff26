//! Status repository implementation
//!
//! Database operations for statuses and their mentions.

use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};
use std::collections::HashMap;

use crate::domain::social::{Account, AccountId, Status, StatusId, Visibility};
use crate::error::{Error, Result};
use crate::storage::Database;

/// Status repository for database operations
#[derive(Debug, Clone)]
pub struct SqliteStatusRepository {
    db: Database,
}

impl SqliteStatusRepository {
    /// Create a new status repository
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a status and its mentions
    ///
    /// The author must already exist in `accounts`.
    pub async fn insert(&self, status: &Status) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO statuses (id, account_id, text, visibility, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(status.id)
        .bind(status.account_id())
        .bind(&status.text)
        .bind(status.visibility.as_str())
        .bind(status.created_at)
        .execute(&mut *tx)
        .await?;

        for account_id in &status.mentioned_account_ids {
            sqlx::query("INSERT OR IGNORE INTO status_mentions (status_id, account_id) VALUES (?, ?)")
                .bind(status.id)
                .bind(account_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete a status; its mentions go with it
    pub async fn delete(&self, id: StatusId) -> Result<()> {
        sqlx::query("DELETE FROM statuses WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    /// Get a status by ID
    pub async fn get(&self, id: StatusId) -> Result<Option<Status>> {
        Ok(self.find_by_ids(&[id]).await?.into_iter().next())
    }

    /// Load statuses in the order of `ids`, skipping ids that don't exist
    pub async fn find_by_ids(&self, ids: &[StatusId]) -> Result<Vec<Status>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            r#"
            SELECT s.id, s.text, s.visibility, s.created_at,
                   a.id AS account_id, a.username, a.domain, a.display_name,
                   a.discoverable, a.silenced
            FROM statuses s
            JOIN accounts a ON a.id = s.account_id
            WHERE s.id IN (
            "#,
        );
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let rows = qb.build().fetch_all(self.db.pool()).await?;
        let mut mentions = self.mentions_for(ids).await?;

        let mut by_id = HashMap::with_capacity(rows.len());
        for row in &rows {
            let mut status = Self::row_to_status(row)?;
            status.mentioned_account_ids = mentions.remove(&status.id).unwrap_or_default();
            by_id.insert(status.id, status);
        }

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    /// Mentioned account ids keyed by status, in one round trip
    async fn mentions_for(&self, ids: &[StatusId]) -> Result<HashMap<StatusId, Vec<AccountId>>> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT status_id, account_id FROM status_mentions WHERE status_id IN (",
        );
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY status_id, account_id");

        let rows: Vec<(StatusId, AccountId)> = qb.build_query_as().fetch_all(self.db.pool()).await?;

        let mut mentions: HashMap<StatusId, Vec<AccountId>> = HashMap::new();
        for (status_id, account_id) in rows {
            mentions.entry(status_id).or_default().push(account_id);
        }
        Ok(mentions)
    }

    /// Convert a joined database row to a Status
    fn row_to_status(row: &SqliteRow) -> Result<Status> {
        let visibility: String = row.get("visibility");
        let visibility = Visibility::parse(&visibility)
            .ok_or_else(|| Error::Other(format!("Unknown visibility in database: {}", visibility)))?;

        Ok(Status {
            id: row.get("id"),
            account: Account {
                id: row.get("account_id"),
                username: row.get("username"),
                domain: row.get("domain"),
                display_name: row.get("display_name"),
                discoverable: row.get("discoverable"),
                silenced: row.get("silenced"),
            },
            text: row.get("text"),
            visibility,
            mentioned_account_ids: Vec::new(),
            created_at: row.get("created_at"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::SqliteAccountRepository;
    use chrono::{TimeZone, Utc};

    async fn setup() -> SqliteStatusRepository {
        let db = Database::in_memory().await.expect("Failed to create database");
        let accounts = SqliteAccountRepository::new(db.clone());
        accounts.insert(&Account::local(1, "alice")).await.unwrap();
        accounts
            .insert(&Account::remote(2, "bob", "remote.example"))
            .await
            .unwrap();
        SqliteStatusRepository::new(db)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = setup().await;
        let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let status = Status::new(10, Account::local(1, "alice"), "hello world")
            .with_visibility(Visibility::Direct)
            .with_mentions(vec![2])
            .with_created_at(created_at);
        repo.insert(&status).await.unwrap();

        let loaded = repo.get(10).await.unwrap().unwrap();
        assert_eq!(loaded.text, "hello world");
        assert_eq!(loaded.visibility, Visibility::Direct);
        assert_eq!(loaded.mentioned_account_ids, vec![2]);
        assert_eq!(loaded.created_at, created_at);
        assert_eq!(loaded.account.username, "alice");
    }

    #[tokio::test]
    async fn test_find_by_ids_preserves_order() {
        let repo = setup().await;
        let bob = Account::remote(2, "bob", "remote.example");
        for id in [1, 2, 3] {
            repo.insert(&Status::new(id, bob.clone(), format!("status {id}")))
                .await
                .unwrap();
        }

        let loaded = repo.find_by_ids(&[3, 99, 1]).await.unwrap();
        let ids: Vec<_> = loaded.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(loaded[0].account_domain(), Some("remote.example"));
    }

    #[tokio::test]
    async fn test_find_by_ids_empty() {
        let repo = setup().await;
        assert!(repo.find_by_ids(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_mentions() {
        let repo = setup().await;
        let status = Status::new(5, Account::local(1, "alice"), "hi @bob").with_mentions(vec![2]);
        repo.insert(&status).await.unwrap();
        repo.delete(5).await.unwrap();

        assert!(repo.get(5).await.unwrap().is_none());
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM status_mentions")
            .fetch_one(repo.db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
