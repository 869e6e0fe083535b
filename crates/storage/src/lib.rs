use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{fs, path::Path, str::FromStr};
use tracing::debug;

/// Process-wide key-value store holding one serialized collection per key.
///
/// Reads and writes always cover the whole collection; there are no partial
/// or delta writes.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    async fn read(&self, name: &str) -> Result<Option<String>>;
    async fn write(&self, name: &str, payload: &str) -> Result<()>;
    async fn remove(&self, name: &str) -> Result<bool>;
    async fn names(&self) -> Result<Vec<String>>;
}

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        create_database_dir(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let mut pool_options = SqlitePoolOptions::new().max_connections(5);
        if is_in_memory(database_url) {
            // an in-memory database lives and dies with its single connection
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_options
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to open sqlite database '{database_url}'"))?;

        let storage = Self { pool };
        storage.ensure_schema().await?;
        Ok(storage)
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS collections (
                name        TEXT PRIMARY KEY NOT NULL,
                payload     TEXT NOT NULL,
                updated_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure collections table exists")?;
        Ok(())
    }
}

/// Loads and decodes a collection. `Ok(None)` when nothing was stored under `name`.
pub async fn read_collection<T, S>(store: &S, name: &str) -> Result<Option<Vec<T>>>
where
    T: DeserializeOwned,
    S: CollectionStore + ?Sized,
{
    let Some(payload) = store.read(name).await? else {
        return Ok(None);
    };
    let records = serde_json::from_str(&payload)
        .with_context(|| format!("stored collection '{name}' is not valid json"))?;
    Ok(Some(records))
}

pub async fn write_collection<T, S>(store: &S, name: &str, records: &[T]) -> Result<()>
where
    T: Serialize,
    S: CollectionStore + ?Sized,
{
    let payload = serde_json::to_string(records)
        .with_context(|| format!("failed to serialize collection '{name}'"))?;
    store.write(name, &payload).await
}

#[async_trait]
impl CollectionStore for Storage {
    async fn read(&self, name: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT payload FROM collections WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to read collection '{name}'"))?;
        Ok(row.map(|r| r.get::<String, _>(0)))
    }

    async fn write(&self, name: &str, payload: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO collections (name, payload, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
             ON CONFLICT(name) DO UPDATE SET payload = excluded.payload, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(name)
        .bind(payload)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to write collection '{name}'"))?;
        debug!(collection = name, bytes = payload.len(), "collection persisted");
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM collections WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to remove collection '{name}'"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn names(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT name FROM collections ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("failed to list collections")?;
        Ok(rows.into_iter().map(|r| r.get::<String, _>(0)).collect())
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

/// File behind a sqlite url; `None` for in-memory databases and other schemes.
fn database_file(database_url: &str) -> Option<&Path> {
    if is_in_memory(database_url) {
        return None;
    }
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let file = rest.split_once('?').map_or(rest, |(file, _)| file);
    (!file.is_empty()).then(|| Path::new(file))
}

fn create_database_dir(database_url: &str) -> Result<()> {
    match database_file(database_url).and_then(Path::parent) {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir).with_context(|| {
            format!("cannot create directory '{}' for {database_url}", dir.display())
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
