//! Store schema migrations.
//!
//! `migration_NN.sql` in this directory upgrades the schema from version `NN-1` to `NN`.

use anyhow::{ensure, Context};
use sqlx::{Executor, SqlitePool};
use tracing::debug;

use crate::Result;

/// The schema version this build of the program expects.
pub(crate) const CURRENT_VERSION: i32 = 1;

struct Migration {
    /// The version the schema is at once `sql` has run.
    version: i32,
    sql: &'static str,
}

/// Ordered by version, with no gaps, ending at `CURRENT_VERSION`.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("migration_01.sql"),
}];

/// Creates the `schema_version` table at version 0 if it does not exist yet.
pub(crate) async fn bootstrap(pool: &SqlitePool) -> Result<()> {
    sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
        .execute(pool)
        .await
        .context("Failed to create schema_version table")?;

    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schema_version")
        .fetch_one(pool)
        .await
        .context("Failed to count schema_version rows")?;
    if row.0 == 0 {
        sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
            .execute(pool)
            .await
            .context("Failed to insert initial schema version")?;
    }
    Ok(())
}

/// Reads the current schema version.
pub(crate) async fn version(pool: &SqlitePool) -> Result<i32> {
    let row: (i32,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await
        .context("Failed to query schema version")?;
    Ok(row.0)
}

/// Upgrades the schema from `from` to `CURRENT_VERSION`. Each step runs in its own transaction
/// together with the `schema_version` update, so an interrupted upgrade resumes where it stopped.
///
/// Downgrades are not supported; callers refuse stores that are newer than this build.
pub(crate) async fn upgrade(pool: &SqlitePool, from: i32) -> Result<()> {
    ensure!(
        from <= CURRENT_VERSION,
        "Schema version {from} is newer than {CURRENT_VERSION}"
    );
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > from).collect();
    if pending.is_empty() {
        debug!("Store already at schema version {from}, no migrations needed");
        return Ok(());
    }
    for migration in pending {
        debug!("Upgrading store schema to version {:02}", migration.version);
        apply(pool, migration).await?;
    }
    Ok(())
}

async fn apply(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    let version = migration.version;
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin migration transaction")?;
    tx.execute(migration.sql)
        .await
        .with_context(|| format!("Failed to apply migration {version:02}"))?;
    sqlx::query("UPDATE schema_version SET version = ?")
        .bind(version)
        .execute(&mut *tx)
        .await
        .context("Failed to update schema_version")?;
    tx.commit()
        .await
        .context("Failed to commit migration transaction")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use tempfile::TempDir;

    async fn create_test_db() -> Result<(TempDir, SqlitePool)> {
        let temp_dir = TempDir::new().context("Failed to create temp dir")?;
        let options = SqliteConnectOptions::new()
            .filename(temp_dir.path().join("test.sqlite"))
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to create SQLite database")?;
        bootstrap(&pool).await?;
        Ok((temp_dir, pool))
    }

    async fn table_exists(pool: &SqlitePool, table_name: &str) -> Result<bool> {
        let row: (i32,) =
            sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?")
                .bind(table_name)
                .fetch_one(pool)
                .await
                .context("Failed to check table existence")?;
        Ok(row.0 > 0)
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let (_temp_dir, pool) = create_test_db().await.unwrap();
        bootstrap(&pool).await.unwrap();
        assert_eq!(version(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_upgrade_from_empty() {
        let (_temp_dir, pool) = create_test_db().await.unwrap();
        upgrade(&pool, 0).await.unwrap();
        assert_eq!(version(&pool).await.unwrap(), CURRENT_VERSION);
        assert!(table_exists(&pool, "kv").await.unwrap());
    }

    #[tokio::test]
    async fn test_upgrade_is_noop_when_current() {
        let (_temp_dir, pool) = create_test_db().await.unwrap();
        upgrade(&pool, 0).await.unwrap();
        upgrade(&pool, CURRENT_VERSION).await.unwrap();
        assert_eq!(version(&pool).await.unwrap(), CURRENT_VERSION);
    }

    #[tokio::test]
    async fn test_upgrade_refuses_newer_schema() {
        let (_temp_dir, pool) = create_test_db().await.unwrap();
        assert!(upgrade(&pool, CURRENT_VERSION + 1).await.is_err());
        assert_eq!(version(&pool).await.unwrap(), 0);
    }

    #[test]
    fn test_migrations_are_contiguous() {
        let versions: Vec<i32> = MIGRATIONS.iter().map(|m| m.version).collect();
        let expected: Vec<i32> = (1..=CURRENT_VERSION).collect();
        assert_eq!(versions, expected);
    }
}
