//! Encrypted secret storage using SQLite.
//!
//! Each secret is a named string (the settings bundle as JSON), sealed with
//! AES-256-GCM. Every write stamps a new time-ordered version id.

use super::encryption;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

/// A decrypted secret together with its bookkeeping columns.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSecret {
    pub name: String,
    pub secret_string: String,
    pub version_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// SQLite-backed secret store.
///
/// # Schema
/// ```sql
/// CREATE TABLE secrets (
///     name TEXT PRIMARY KEY,
///     secret_string TEXT NOT NULL,  -- Encrypted
///     nonce TEXT NOT NULL,
///     version_id TEXT NOT NULL,     -- UUID v7
///     created_at TEXT NOT NULL,     -- RFC 3339
///     updated_at TEXT NOT NULL      -- RFC 3339
/// );
/// ```
pub struct SettingsStore {
    conn: Mutex<Connection>,
    encryption_key: Vec<u8>,
}

impl SettingsStore {
    /// Open or create a store. `encryption_key` is the base64 master key.
    pub fn new<P: AsRef<Path>>(db_path: P, encryption_key: &str) -> Result<Self> {
        let key = encryption::decode_key(encryption_key).context("Invalid encryption key")?;

        let conn = Connection::open(db_path).context("Failed to open settings database")?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS secrets (
                name TEXT PRIMARY KEY,
                secret_string TEXT NOT NULL,
                nonce TEXT NOT NULL,
                version_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            [],
        )
        .context("Failed to create secrets table")?;

        Ok(Self {
            conn: Mutex::new(conn),
            encryption_key: key,
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Settings database lock poisoned"))
    }

    /// Fetch and decrypt a secret. `Ok(None)` when no secret has that name.
    pub fn get(&self, name: &str) -> Result<Option<StoredSecret>> {
        let row = self
            .conn()?
            .query_row(
                r#"
                SELECT secret_string, nonce, version_id, created_at, updated_at
                FROM secrets WHERE name = ?1
                "#,
                params![name],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()
            .context("Failed to query secret")?;

        let Some((ciphertext, nonce, version_id, created_at, updated_at)) = row else {
            debug!(name = %name, "Secret not found");
            return Ok(None);
        };

        let secret_string = encryption::open(&ciphertext, &nonce, &self.encryption_key)
            .context("Failed to decrypt secret")?;

        Ok(Some(StoredSecret {
            name: name.to_string(),
            secret_string,
            version_id: Uuid::parse_str(&version_id).context("Failed to parse version id")?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        }))
    }

    /// Store a new secret. Fails when `name` already exists.
    pub fn create(&self, name: &str, secret_string: &str) -> Result<Uuid> {
        let (ciphertext, nonce) = encryption::seal(secret_string, &self.encryption_key)
            .context("Failed to encrypt secret")?;
        let version_id = Uuid::now_v7();
        let now = Utc::now().to_rfc3339();

        let inserted = self
            .conn()?
            .execute(
                r#"
                INSERT INTO secrets (name, secret_string, nonce, version_id, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                ON CONFLICT(name) DO NOTHING
                "#,
                params![name, ciphertext, nonce, version_id.to_string(), now],
            )
            .context("Failed to create secret")?;

        if inserted == 0 {
            return Err(anyhow!("Secret '{}' already exists", name));
        }

        info!(name = %name, version_id = %version_id, "Secret created");
        Ok(version_id)
    }

    /// Replace the value of an existing secret. Fails when `name` is missing.
    pub fn put(&self, name: &str, secret_string: &str) -> Result<Uuid> {
        let (ciphertext, nonce) = encryption::seal(secret_string, &self.encryption_key)
            .context("Failed to encrypt secret")?;
        let version_id = Uuid::now_v7();
        let now = Utc::now().to_rfc3339();

        let updated = self
            .conn()?
            .execute(
                r#"
                UPDATE secrets
                SET secret_string = ?2, nonce = ?3, version_id = ?4, updated_at = ?5
                WHERE name = ?1
                "#,
                params![name, ciphertext, nonce, version_id.to_string(), now],
            )
            .context("Failed to update secret")?;

        if updated == 0 {
            return Err(anyhow!("Secret '{}' not found", name));
        }

        info!(name = %name, version_id = %version_id, "Secret updated");
        Ok(version_id)
    }

    /// Remove a secret. Returns whether anything was deleted.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let deleted = self
            .conn()?
            .execute("DELETE FROM secrets WHERE name = ?1", params![name])
            .context("Failed to delete secret")?;

        Ok(deleted > 0)
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Failed to parse timestamp {}", value))
}
