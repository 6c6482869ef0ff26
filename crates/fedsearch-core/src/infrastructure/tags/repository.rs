//! Hashtag repository implementation

use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::Result;
use crate::domain::search::{TagSearch, TagSearchOptions};
use crate::domain::social::Tag;
use crate::infrastructure::{escape_like, sql_count};
use crate::storage::Database;

/// Hashtag repository for database operations
#[derive(Debug, Clone)]
pub struct SqliteTagRepository {
    db: Database,
}

impl SqliteTagRepository {
    /// Create a new tag repository
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert or replace a tag; the name is stored lowercased without `#`
    pub async fn insert(&self, tag: &Tag) -> Result<()> {
        let name = tag.name.trim_start_matches('#').to_lowercase();
        sqlx::query(
            r#"
            INSERT INTO tags (id, name, reviewed, listable)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                reviewed = excluded.reviewed,
                listable = excluded.listable
            "#,
        )
        .bind(tag.id)
        .bind(name)
        .bind(tag.reviewed)
        .bind(tag.listable)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    /// Get a tag by name
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let Some(name) = Tag::normalize(name) else {
            return Ok(None);
        };
        let row = sqlx::query("SELECT id, name, reviewed, listable FROM tags WHERE name = ?")
            .bind(name)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|r| Self::row_to_tag(&r)))
    }

    fn row_to_tag(row: &SqliteRow) -> Tag {
        Tag {
            id: row.get("id"),
            name: row.get("name"),
            reviewed: row.get("reviewed"),
            listable: row.get("listable"),
        }
    }
}

#[async_trait]
impl TagSearch for SqliteTagRepository {
    async fn search(&self, query: &str, limit: u64, options: TagSearchOptions) -> Result<Vec<Tag>> {
        let Some(name) = Tag::normalize(query) else {
            tracing::debug!(query, "Query is not a valid hashtag");
            return Ok(Vec::new());
        };

        let rows = sqlx::query(
            r#"
            SELECT id, name, reviewed, listable FROM tags
            WHERE name LIKE ? ESCAPE '\'
              AND listable = 1
              AND (? = 0 OR reviewed = 1)
            ORDER BY CASE WHEN name = ? THEN 0 ELSE 1 END, length(name), name
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(format!("{}%", escape_like(&name)))
        .bind(options.exclude_unreviewed)
        .bind(&name)
        .bind(sql_count(limit))
        .bind(sql_count(options.offset))
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(Self::row_to_tag).collect())
    }
}
