use std::time::Duration;

use anyhow::{Context, Result};
use log::info;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};

/// Remote Store backed by SQLite.
///
/// Cheap to clone: the underlying [`DatabaseConnection`] is a pool handle.
#[derive(Clone, Debug)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    /// Open (creating if needed) the database at `database_url` and make sure the schema exists.
    ///
    /// In-memory URLs are pinned to a single pooled connection so every query
    /// sees the same database.
    pub async fn open(database_url: &str) -> Result<Self> {
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

        let mut options = ConnectOptions::new(database_url.to_string());
        if in_memory {
            // min == max keeps the pool from reaping the only connection
            options.min_connections(1).max_connections(1);
        } else {
            options.min_connections(1).max_connections(4);
        }
        options
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .with_context(|| format!("Failed to open database: {database_url}"))?;

        let store = Store { conn };
        store.init_schema().await?;
        info!("💾 Store ready at {database_url}");
        Ok(store)
    }

    /// Fresh private in-memory store.
    pub async fn in_memory() -> Result<Self> {
        Self::open("sqlite::memory:").await
    }

    /// Initialize database schema
    async fn init_schema(&self) -> Result<()> {
        self.conn.execute_unprepared("PRAGMA foreign_keys = ON").await?;

        self.conn
            .execute_unprepared(
                r"
                CREATE TABLE IF NOT EXISTS projects (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    description TEXT,
                    shared_user_ids TEXT,
                    created_at TEXT NOT NULL
                )
                ",
            )
            .await
            .context("Failed to create projects table")?;

        self.conn
            .execute_unprepared(
                r"
                CREATE TABLE IF NOT EXISTS todos (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    text TEXT NOT NULL,
                    completed BOOLEAN NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL,
                    project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                    user_ids TEXT
                )
                ",
            )
            .await
            .context("Failed to create todos table")?;

        self.conn
            .execute_unprepared("CREATE INDEX IF NOT EXISTS idx_todos_project_id ON todos(project_id)")
            .await?;

        Ok(())
    }
}
