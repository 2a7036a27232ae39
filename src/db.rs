use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::app::feed::FeedItem;
use crate::app::reconcile::{PlayedRecord, Store};

pub const PLAYED_RECORDS_KEY: &str = "playedVideos";
pub const SNAPSHOT_KEY: &str = "previousVideos";

#[derive(Debug, Clone)]
pub struct StoredValue {
    pub value: String,
    pub updated_at: String,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        Ok(Self { conn })
    }

    pub fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    pub fn put_value(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            r#"
            INSERT INTO kv_state (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value, now],
        )?;
        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Result<Option<StoredValue>> {
        let stored = self
            .conn
            .query_row(
                "SELECT value, updated_at FROM kv_state WHERE key = ?1",
                params![key],
                |row| {
                    Ok(StoredValue {
                        value: row.get(0)?,
                        updated_at: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(stored)
    }

    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        match self.get_value(key)? {
            Some(stored) => serde_json::from_str(&stored.value)
                .with_context(|| format!("stored value for '{key}' is not valid JSON")),
            None => Ok(Vec::new()),
        }
    }

    fn save_json<T: Serialize>(&self, key: &str, values: &[T]) -> Result<()> {
        let raw = serde_json::to_string(values)
            .with_context(|| format!("failed to encode value for '{key}'"))?;
        self.put_value(key, &raw)
    }
}

impl Store for Database {
    fn load_played_records(&self) -> Result<Vec<PlayedRecord>> {
        self.load_json(PLAYED_RECORDS_KEY)
    }

    fn save_played_records(&self, records: &[PlayedRecord]) -> Result<()> {
        self.save_json(PLAYED_RECORDS_KEY, records)
    }

    fn load_snapshot(&self) -> Result<Vec<FeedItem>> {
        self.load_json(SNAPSHOT_KEY)
    }

    fn save_snapshot(&self, snapshot: &[FeedItem]) -> Result<()> {
        self.save_json(SNAPSHOT_KEY, snapshot)
    }
}
