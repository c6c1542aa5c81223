//! SQLite-based token storage

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use rusqlite_migration::{M, Migrations};

use super::traits::{StoredUser, TokenStore};

/// Database migrations
///
/// Each migration is applied in order. The user_version pragma tracks which
/// migrations have been applied.
fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        // Migration 1: Initial schema
        M::up(
            r#"
            CREATE TABLE users (
                email TEXT PRIMARY KEY,
                access_token TEXT NOT NULL,
                refresh_token TEXT,
                updated_at TEXT NOT NULL
            );
            "#,
        ),
    ])
}

/// SQLite-backed [`TokenStore`]
pub struct SqliteTokenStore {
    conn: Mutex<Connection>,
}

impl SqliteTokenStore {
    /// Open (or create) a token database at `db_path`
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path.as_ref())
            .with_context(|| format!("Failed to open database at {:?}", db_path.as_ref()))?;
        Self::with_connection(conn)
    }

    /// Open a private in-memory database
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::with_connection(conn)
    }

    fn with_connection(mut conn: Connection) -> Result<Self> {
        // WAL lets the CLI read while another process writes
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            "#,
        )?;

        migrations()
            .to_latest(&mut conn)
            .context("Failed to run database migrations")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("token database lock poisoned"))
    }

    fn load_user(conn: &Connection, email: &str) -> Result<Option<StoredUser>> {
        let row: Option<(String, String, Option<String>, String)> = conn
            .query_row(
                "SELECT email, access_token, refresh_token, updated_at
                 FROM users WHERE email = ?",
                [email],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        let Some((email, access_token, refresh_token, updated_at)) = row else {
            return Ok(None);
        };

        let updated_at = DateTime::parse_from_rfc3339(&updated_at)
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("Corrupt updated_at for {}", email))?;

        Ok(Some(StoredUser {
            email,
            access_token,
            refresh_token,
            updated_at,
        }))
    }
}

impl TokenStore for SqliteTokenStore {
    fn upsert(
        &self,
        email: &str,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<StoredUser> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO users (email, access_token, refresh_token, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(email) DO UPDATE SET
                access_token = excluded.access_token,
                refresh_token = COALESCE(excluded.refresh_token, users.refresh_token),
                updated_at = excluded.updated_at",
            params![email, access_token, refresh_token, Utc::now().to_rfc3339()],
        )?;

        Self::load_user(&conn, email)?
            .with_context(|| format!("User {} missing right after upsert", email))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>> {
        let conn = self.conn()?;
        Self::load_user(&conn, email)
    }

    fn delete(&self, email: &str) -> Result<bool> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM users WHERE email = ?", [email])?;
        Ok(removed > 0)
    }
}
