//! Implements the `Store` trait on top of a SQLite file.

use crate::store::{migrations, Store, PROBE_KEY};
use crate::Result;
use anyhow::{bail, Context};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Stores each key as one row of the `kv` table, with the value serialized as JSON text.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
    pool: SqlitePool,
}

impl SqliteStore {
    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the schema
    pub async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A store already exists at '{}'", path.display());
        }
        let pool = connect(path, true).await?;
        migrations::bootstrap(&pool).await?;
        migrations::upgrade(&pool, 0).await?;
        debug!("Created store at {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            pool,
        })
    }

    /// - Validates that there is a SQLite file at `path`
    /// - Updates the schema with migrations if it is out-of-date
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("The store is missing '{}'", path.display());
        }
        let pool = connect(path, false).await?;
        migrations::bootstrap(&pool).await?;
        let current = migrations::version(&pool).await?;
        if current > migrations::CURRENT_VERSION {
            bail!(
                "The store at '{}' has schema version {current}, which is newer than this \
                program supports ({}). Is a newer version of txtrack available?",
                path.display(),
                migrations::CURRENT_VERSION
            );
        }
        migrations::upgrade(&pool, current).await?;
        Ok(Self {
            path: path.to_path_buf(),
            pool,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn connect(path: &Path, create: bool) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("Unable to open SQLite store at {}", path.display()))
}

#[async_trait::async_trait]
impl Store for SqliteStore {
    async fn is_available(&self) -> bool {
        let probe = Value::String(PROBE_KEY.to_string());
        if let Err(e) = self.save(PROBE_KEY, &probe).await {
            warn!("Store availability check failed: {e:#}");
            return false;
        }
        if let Err(e) = self.remove(PROBE_KEY).await {
            warn!("Store availability check failed: {e:#}");
            return false;
        }
        true
    }

    async fn save(&self, key: &str, value: &Value) -> Result<()> {
        let text = serde_json::to_string(value)
            .with_context(|| format!("Unable to serialize the value for '{key}'"))?;
        sqlx::query(
            "INSERT INTO kv (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, \
             updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        )
        .bind(key)
        .bind(text)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Unable to save '{key}'"))?;
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<Value>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Unable to load '{key}'"))?;
        match row {
            None => Ok(None),
            Some((text,)) => serde_json::from_str(&text)
                .map(Some)
                .with_context(|| format!("The stored value for '{key}' is not valid JSON")),
        }
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to remove '{key}'"))?;
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
