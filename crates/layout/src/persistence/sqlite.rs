#![forbid(unsafe_code)]

use super::SnapshotStore;
use crate::domain::Snapshot;
use crate::error::Error;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::debug;

const COLUMNS: &str =
    "id, name, description, created_at, windows_json, displays_json, metadata_json";

/// Snapshots in a SQLite database. Windows, displays and metadata are kept
/// as JSON text columns.
#[derive(Debug, Clone)]
pub struct SqliteSnapshotStore {
    path: PathBuf,
    pool: SqlitePool,
}

impl SqliteSnapshotStore {
    /// Open (creating if needed) the database at `path` and apply migrations.
    pub async fn new(path: PathBuf) -> Result<Self, Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(sqlx::Error::from)?;

        debug!(path = %path.display(), "opened snapshot store");
        Ok(Self { path, pool })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn decode(row: &SqliteRow) -> Result<Snapshot, Error> {
        let created_at: i64 = row.try_get("created_at")?;
        let windows: String = row.try_get("windows_json")?;
        let displays: String = row.try_get("displays_json")?;
        let metadata: String = row.try_get("metadata_json")?;

        Ok(Snapshot {
            id: Some(row.try_get("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            created_at: from_unix(created_at),
            windows: serde_json::from_str(&windows)?,
            displays: serde_json::from_str(&displays)?,
            metadata: serde_json::from_str(&metadata)?,
        })
    }
}

fn to_unix(time: SystemTime) -> i64 {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn from_unix(secs: i64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(secs.max(0).unsigned_abs())
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn get(&self, name: &str) -> Result<Option<Snapshot>, Error> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM snapshots WHERE name = ? AND is_active = 1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(Self::decode).transpose()
    }

    async fn list(&self) -> Result<Vec<Snapshot>, Error> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM snapshots WHERE is_active = 1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::decode).collect()
    }

    async fn names(&self) -> Result<Vec<String>, Error> {
        let names = sqlx::query_scalar("SELECT name FROM snapshots WHERE is_active = 1 ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<i64, Error> {
        if snapshot.name.is_empty() {
            return Err(Error::EmptyName);
        }

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO snapshots \
             (name, description, created_at, windows_json, displays_json, metadata_json, is_active) \
             VALUES (?, ?, ?, ?, ?, ?, 1) \
             ON CONFLICT(name) DO UPDATE SET \
             description = excluded.description, \
             created_at = excluded.created_at, \
             windows_json = excluded.windows_json, \
             displays_json = excluded.displays_json, \
             metadata_json = excluded.metadata_json, \
             is_active = 1 \
             RETURNING id",
        )
        .bind(&snapshot.name)
        .bind(&snapshot.description)
        .bind(to_unix(snapshot.created_at))
        .bind(serde_json::to_string(&snapshot.windows)?)
        .bind(serde_json::to_string(&snapshot.displays)?)
        .bind(serde_json::to_string(&snapshot.metadata)?)
        .fetch_one(&self.pool)
        .await?;

        debug!(snapshot = %snapshot.name, id, windows = snapshot.windows.len(), "saved snapshot");
        Ok(id)
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        let result = sqlx::query("UPDATE snapshots SET is_active = 0 WHERE name = ? AND is_active = 1")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_window(
        &self,
        name: &str,
        app_name: &str,
        window_title: Option<&str>,
    ) -> Result<bool, Error> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM snapshots WHERE name = ? AND is_active = 1"
        ))
        .bind(name)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(mut snapshot) = row.as_ref().map(Self::decode).transpose()? else {
            return Ok(false);
        };
        if !snapshot.remove_window(app_name, window_title) {
            return Ok(false);
        }

        sqlx::query("UPDATE snapshots SET windows_json = ? WHERE id = ?")
            .bind(serde_json::to_string(&snapshot.windows)?)
            .bind(snapshot.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(true)
    }
}
