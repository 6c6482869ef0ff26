//! Database migrations
//!
//! This module manages SQLite schema migrations for fedsearch.
//! Migrations are versioned and applied automatically on database connection.

use sqlx::SqlitePool;

/// Current schema version
pub const CURRENT_VERSION: i32 = 2;

/// SQL for creating the migrations tracking table
const CREATE_MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        version INTEGER PRIMARY KEY NOT NULL,
        applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

/// Migration 1: Accounts, statuses, tags and relationships
const MIGRATION_V1: &str = r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id INTEGER PRIMARY KEY NOT NULL,
        username TEXT NOT NULL,
        domain TEXT,
        display_name TEXT NOT NULL DEFAULT '',
        discoverable INTEGER NOT NULL DEFAULT 0,
        silenced INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    CREATE UNIQUE INDEX IF NOT EXISTS idx_accounts_acct
        ON accounts(lower(username), COALESCE(lower(domain), ''));

    CREATE TABLE IF NOT EXISTS statuses (
        id INTEGER PRIMARY KEY NOT NULL,
        account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        text TEXT NOT NULL DEFAULT '',
        visibility TEXT NOT NULL DEFAULT 'public'
            CHECK (visibility IN ('public', 'unlisted', 'private', 'direct')),
        created_at TIMESTAMP NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_statuses_account_id ON statuses(account_id);

    CREATE TABLE IF NOT EXISTS status_mentions (
        status_id INTEGER NOT NULL REFERENCES statuses(id) ON DELETE CASCADE,
        account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        PRIMARY KEY (status_id, account_id)
    );

    CREATE TABLE IF NOT EXISTS tags (
        id INTEGER PRIMARY KEY NOT NULL,
        name TEXT NOT NULL UNIQUE,
        reviewed INTEGER NOT NULL DEFAULT 0,
        listable INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE IF NOT EXISTS follows (
        account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        target_account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        PRIMARY KEY (account_id, target_account_id)
    );

    CREATE TABLE IF NOT EXISTS blocks (
        account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        target_account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        PRIMARY KEY (account_id, target_account_id)
    );

    CREATE INDEX IF NOT EXISTS idx_blocks_target ON blocks(target_account_id);

    CREATE TABLE IF NOT EXISTS mutes (
        account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        target_account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        PRIMARY KEY (account_id, target_account_id)
    );

    CREATE TABLE IF NOT EXISTS account_domain_blocks (
        account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        domain TEXT NOT NULL,
        PRIMARY KEY (account_id, domain)
    );
"#;

/// Migration 2: Status search index
///
/// The index is maintained separately from `statuses` and has no foreign
/// key to it, so entries may outlive the statuses they describe.
const MIGRATION_V2: &str = r#"
    CREATE TABLE IF NOT EXISTS status_index (
        id INTEGER PRIMARY KEY NOT NULL,
        account_id INTEGER NOT NULL,
        text TEXT NOT NULL DEFAULT '',
        visibility TEXT NOT NULL,
        discoverable INTEGER NOT NULL DEFAULT 0,
        silenced INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_status_index_account_id ON status_index(account_id);
    CREATE INDEX IF NOT EXISTS idx_status_index_created_at ON status_index(created_at);

    CREATE TABLE IF NOT EXISTS status_index_searchable_by (
        status_id INTEGER NOT NULL,
        account_id INTEGER NOT NULL,
        PRIMARY KEY (status_id, account_id)
    );

    CREATE INDEX IF NOT EXISTS idx_status_index_searchable_by_account
        ON status_index_searchable_by(account_id);
"#;

/// Get the current schema version from the database
async fn get_current_version(pool: &SqlitePool) -> anyhow::Result<i32> {
    // Ensure migrations table exists
    sqlx::raw_sql(CREATE_MIGRATIONS_TABLE).execute(pool).await?;

    let (version,): (i32,) = sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM _migrations")
        .fetch_one(pool)
        .await?;

    Ok(version)
}

/// Record that a migration has been applied
async fn record_migration(pool: &SqlitePool, version: i32) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO _migrations (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;
    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    let current_version = get_current_version(pool).await?;

    tracing::info!(
        current_version = current_version,
        target_version = CURRENT_VERSION,
        "Checking database migrations"
    );

    if current_version >= CURRENT_VERSION {
        tracing::debug!("Database is up to date");
        return Ok(());
    }

    if current_version < 1 {
        tracing::info!("Applying migration v1: Accounts, statuses and relationships");
        sqlx::raw_sql(MIGRATION_V1).execute(pool).await?;
        record_migration(pool, 1).await?;
    }

    if current_version < 2 {
        tracing::info!("Applying migration v2: Status search index");
        sqlx::raw_sql(MIGRATION_V2).execute(pool).await?;
        record_migration(pool, 2).await?;
    }

    tracing::info!("Database migrations completed");
    Ok(())
}

/// Get migration status information
pub async fn migration_status(pool: &SqlitePool) -> anyhow::Result<MigrationStatus> {
    let current_version = get_current_version(pool).await?;
    Ok(MigrationStatus {
        current_version,
        target_version: CURRENT_VERSION,
        needs_migration: current_version < CURRENT_VERSION,
    })
}

/// Migration status information
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Current schema version in the database
    pub current_version: i32,
    /// Target schema version (latest)
    pub target_version: i32,
    /// Whether migrations need to be run
    pub needs_migration: bool,
}
