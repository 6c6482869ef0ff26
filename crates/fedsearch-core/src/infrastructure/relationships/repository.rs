//! Relationship repository implementation
//!
//! Writers for follows, blocks, mutes and domain blocks, and the batched
//! `RelationshipStore` lookups used when filtering search results.

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};
use std::collections::{HashMap, HashSet};

use crate::Result;
use crate::domain::relationship::RelationshipStore;
use crate::domain::social::AccountId;
use crate::storage::Database;

/// Relationship repository for database operations
#[derive(Debug, Clone)]
pub struct SqliteRelationshipRepository {
    db: Database,
}

impl SqliteRelationshipRepository {
    /// Create a new relationship repository
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// `account_id` follows `target_account_id`
    pub async fn follow(&self, account_id: AccountId, target_account_id: AccountId) -> Result<()> {
        self.link("follows", account_id, target_account_id).await
    }

    pub async fn unfollow(&self, account_id: AccountId, target_account_id: AccountId) -> Result<()> {
        self.unlink("follows", account_id, target_account_id).await
    }

    /// `account_id` blocks `target_account_id`
    pub async fn block(&self, account_id: AccountId, target_account_id: AccountId) -> Result<()> {
        self.link("blocks", account_id, target_account_id).await
    }

    pub async fn unblock(&self, account_id: AccountId, target_account_id: AccountId) -> Result<()> {
        self.unlink("blocks", account_id, target_account_id).await
    }

    /// `account_id` mutes `target_account_id`
    pub async fn mute(&self, account_id: AccountId, target_account_id: AccountId) -> Result<()> {
        self.link("mutes", account_id, target_account_id).await
    }

    pub async fn unmute(&self, account_id: AccountId, target_account_id: AccountId) -> Result<()> {
        self.unlink("mutes", account_id, target_account_id).await
    }

    /// `account_id` hides everything from `domain`
    pub async fn block_domain(&self, account_id: AccountId, domain: &str) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO account_domain_blocks (account_id, domain) VALUES (?, ?)")
            .bind(account_id)
            .bind(domain.to_lowercase())
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    pub async fn unblock_domain(&self, account_id: AccountId, domain: &str) -> Result<()> {
        sqlx::query("DELETE FROM account_domain_blocks WHERE account_id = ? AND domain = ?")
            .bind(account_id)
            .bind(domain.to_lowercase())
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    async fn link(&self, table: &str, account_id: AccountId, target_account_id: AccountId) -> Result<()> {
        sqlx::query(&format!(
            "INSERT OR IGNORE INTO {table} (account_id, target_account_id) VALUES (?, ?)"
        ))
        .bind(account_id)
        .bind(target_account_id)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    async fn unlink(&self, table: &str, account_id: AccountId, target_account_id: AccountId) -> Result<()> {
        sqlx::query(&format!(
            "DELETE FROM {table} WHERE account_id = ? AND target_account_id = ?"
        ))
        .bind(account_id)
        .bind(target_account_id)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    /// One `IN (...)` lookup: which of `ids` appear in `candidate_column`
    /// on rows whose `viewer_column` is the viewer
    async fn id_map(
        &self,
        table: &str,
        viewer_column: &str,
        candidate_column: &str,
        ids: &[AccountId],
        viewer_id: AccountId,
    ) -> Result<HashMap<AccountId, bool>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT {candidate_column} FROM {table} WHERE {viewer_column} = "
        ));
        qb.push_bind(viewer_id)
            .push(format!(" AND {candidate_column} IN ("));
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let rows: Vec<(AccountId,)> = qb.build_query_as().fetch_all(self.db.pool()).await?;
        let present: HashSet<AccountId> = rows.into_iter().map(|(id,)| id).collect();

        Ok(ids.iter().map(|id| (*id, present.contains(id))).collect())
    }
}

#[async_trait]
impl RelationshipStore for SqliteRelationshipRepository {
    async fn blocking_map(
        &self,
        ids: &[AccountId],
        viewer_id: AccountId,
    ) -> Result<HashMap<AccountId, bool>> {
        self.id_map("blocks", "account_id", "target_account_id", ids, viewer_id)
            .await
    }

    async fn blocked_by_map(
        &self,
        ids: &[AccountId],
        viewer_id: AccountId,
    ) -> Result<HashMap<AccountId, bool>> {
        self.id_map("blocks", "target_account_id", "account_id", ids, viewer_id)
            .await
    }

    async fn muting_map(
        &self,
        ids: &[AccountId],
        viewer_id: AccountId,
    ) -> Result<HashMap<AccountId, bool>> {
        self.id_map("mutes", "account_id", "target_account_id", ids, viewer_id)
            .await
    }

    async fn following_map(
        &self,
        ids: &[AccountId],
        viewer_id: AccountId,
    ) -> Result<HashMap<AccountId, bool>> {
        self.id_map("follows", "account_id", "target_account_id", ids, viewer_id)
            .await
    }

    async fn domain_blocking_map(
        &self,
        domains: &[String],
        viewer_id: AccountId,
    ) -> Result<HashMap<String, bool>> {
        if domains.is_empty() {
            return Ok(HashMap::new());
        }

        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT domain FROM account_domain_blocks WHERE account_id = ");
        qb.push_bind(viewer_id).push(" AND domain IN (");
        let mut separated = qb.separated(", ");
        for domain in domains {
            separated.push_bind(domain.to_lowercase());
        }
        separated.push_unseparated(")");

        let rows: Vec<(String,)> = qb.build_query_as().fetch_all(self.db.pool()).await?;
        let blocked: HashSet<String> = rows.into_iter().map(|(d,)| d).collect();

        Ok(domains
            .iter()
            .map(|d| (d.clone(), blocked.contains(&d.to_lowercase())))
            .collect())
    }

    async fn following_ids(&self, viewer_id: AccountId) -> Result<Vec<AccountId>> {
        let rows: Vec<(AccountId,)> = sqlx::query_as(
            "SELECT target_account_id FROM follows WHERE account_id = ? ORDER BY target_account_id",
        )
        .bind(viewer_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
