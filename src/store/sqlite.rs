//! SQLite-backed warehouse implementation.
//!
//! A single `videos` table holds the catalog; loads run in overwrite mode
//! inside one transaction so a failed load never leaves a half-replaced table.

use super::{VideoRecord, Warehouse};
use crate::error::{Result, SokError};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

/// Idempotent schema provisioning statements, run in order.
const PROVISION_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS videos (
        VIDEO_TITLE TEXT NOT NULL,
        THUMBNAIL TEXT NOT NULL,
        VIDEO_DESCRIPTION TEXT NOT NULL,
        VIDEO_YEAR INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_videos_year ON videos(VIDEO_YEAR);
"#;

/// SQLite-backed warehouse.
pub struct SqliteWarehouse {
    conn: Mutex<Connection>,
}

impl SqliteWarehouse {
    /// Open (or create) a warehouse database at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        info!("Opened warehouse at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory warehouse (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| SokError::Warehouse(format!("Failed to acquire lock: {}", e)))
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<VideoRecord> {
        Ok(VideoRecord {
            title: row.get(0)?,
            thumbnail_url: row.get(1)?,
            description: row.get(2)?,
            year: row.get(3)?,
        })
    }
}

#[async_trait]
impl Warehouse for SqliteWarehouse {
    #[instrument(skip(self))]
    async fn provision(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(PROVISION_SQL)?;
        info!("Provisioned videos table");
        Ok(())
    }

    #[instrument(skip(self, rows))]
    async fn replace_all(&self, rows: &[VideoRecord]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute("DELETE FROM videos", [])?;

        for record in rows {
            tx.execute(
                r#"
                INSERT INTO videos (VIDEO_TITLE, THUMBNAIL, VIDEO_DESCRIPTION, VIDEO_YEAR)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![
                    record.title,
                    record.thumbnail_url,
                    record.description,
                    record.year,
                ],
            )?;
        }

        tx.commit()?;
        info!("Loaded {} videos into warehouse", rows.len());
        Ok(rows.len())
    }

    #[instrument(skip(self))]
    async fn preview(&self, limit: usize) -> Result<Vec<VideoRecord>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT VIDEO_TITLE, THUMBNAIL, VIDEO_DESCRIPTION, VIDEO_YEAR
            FROM videos
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map(params![limit], Self::row_to_record)?;
        let result: Vec<VideoRecord> = rows.filter_map(|r| r.ok()).collect();

        debug!("Previewed {} rows", result.len());
        Ok(result)
    }

    async fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM videos", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    #[instrument(skip(self))]
    async fn all(&self) -> Result<Vec<VideoRecord>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT VIDEO_TITLE, THUMBNAIL, VIDEO_DESCRIPTION, VIDEO_YEAR FROM videos",
        )?;

        let rows = stmt.query_map([], Self::row_to_record)?;
        let result: Vec<VideoRecord> = rows.filter_map(|r| r.ok()).collect();

        debug!("Fetched {} rows", result.len());
        Ok(result)
    }

    #[instrument(skip(self))]
    async fn drop_table(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch("DROP TABLE IF EXISTS videos;")?;
        info!("Dropped videos table");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, year: i32) -> VideoRecord {
        VideoRecord {
            title: title.to_string(),
            thumbnail_url: format!("https://img.example/{}.jpg", title),
            description: format!("About {}", title),
            year,
        }
    }

    #[tokio::test]
    async fn test_provision_and_load() {
        let store = SqliteWarehouse::in_memory().unwrap();
        store.provision().await.unwrap();

        // Provisioning is idempotent
        store.provision().await.unwrap();

        let loaded = store
            .replace_all(&[record("a", 2015), record("b", 2018)])
            .await
            .unwrap();
        assert_eq!(loaded, 2);
        assert_eq!(store.count().await.unwrap(), 2);

        let preview = store.preview(1).await.unwrap();
        assert_eq!(preview.len(), 1);
        assert_eq!(preview[0].title, "a");
    }

    #[tokio::test]
    async fn test_replace_all_overwrites() {
        let store = SqliteWarehouse::in_memory().unwrap();
        store.provision().await.unwrap();

        store.replace_all(&[record("old", 2010)]).await.unwrap();
        store
            .replace_all(&[record("new1", 2020), record("new2", 2021)])
            .await
            .unwrap();

        let all = store.all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|r| r.title.starts_with("new")));
    }

    #[tokio::test]
    async fn test_drop_table() {
        let store = SqliteWarehouse::in_memory().unwrap();
        store.provision().await.unwrap();
        store.replace_all(&[record("a", 2015)]).await.unwrap();

        store.drop_table().await.unwrap();
        assert!(store.count().await.is_err());
    }

    #[tokio::test]
    async fn test_new_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("catalog.db");

        let store = SqliteWarehouse::new(&path).unwrap();
        store.provision().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
