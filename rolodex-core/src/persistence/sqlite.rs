//! SQLite-backed contact store.
//!
//! The directory lives as one JSON blob under a single key:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS kv_store (
//!     key        TEXT PRIMARY KEY,
//!     data       BLOB NOT NULL,
//!     updated_at TEXT NOT NULL,
//!     checksum   TEXT
//! );
//! ```
//!
//! Saves are a transactional upsert, so a reader never sees half a set.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use tracing::{debug, info, warn};

use super::{decode_contacts, encode_contacts, ContactStore};
use crate::config::PersistenceConfig;
use crate::contact::Contact;
use crate::error::{Result, RolodexError};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv_store (
    key        TEXT PRIMARY KEY,
    data       BLOB NOT NULL,
    updated_at TEXT NOT NULL,
    checksum   TEXT
);";

/// CRC-32 (ISO 3309) of `data` as lowercase hex.
fn crc32_hex(data: &[u8]) -> String {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (POLY & mask);
        }
    }
    format!("{:08x}", !crc)
}

/// Handle to an SQLite database holding the directory blob.
///
/// ```no_run
/// # use rolodex_core::persistence::{ContactStore, SqliteStore};
/// # use rolodex_core::config::PersistenceConfig;
/// let store = SqliteStore::open("contacts.db", &PersistenceConfig::default())?;
/// store.save(&[])?;
/// assert!(store.load().is_empty());
/// # Ok::<(), rolodex_core::RolodexError>(())
/// ```
pub struct SqliteStore {
    conn: Connection,
    key: String,
    checksum_enabled: bool,
    db_path: PathBuf,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open (or create) a database at `path`, creating the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns [`RolodexError::Database`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P, config: &PersistenceConfig) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(&db_path, flags)?;
        if config.wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
        conn.execute_batch(SCHEMA)?;

        info!(
            path = %db_path.display(),
            wal = config.wal_mode,
            key = %config.key,
            "SQLite contact store opened"
        );

        Ok(Self {
            conn,
            key: config.key.clone(),
            checksum_enabled: config.checksum_enabled,
            db_path,
        })
    }

    /// Open an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`RolodexError::Database`] on SQLite failures.
    pub fn open_in_memory(config: &PersistenceConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            key: config.key.clone(),
            checksum_enabled: config.checksum_enabled,
            db_path: PathBuf::from(":memory:"),
        })
    }

    fn try_save(&self, contacts: &[Contact]) -> Result<usize> {
        let json = encode_contacts(contacts)?;
        let checksum = self.checksum_enabled.then(|| crc32_hex(&json));
        let now = Utc::now().to_rfc3339();

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO kv_store (key, data, updated_at, checksum)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(key) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at,
                checksum = excluded.checksum",
            params![self.key, json, now, checksum],
        )?;
        tx.commit()?;
        Ok(json.len())
    }

    fn try_load(&self) -> Result<Vec<Contact>> {
        let row: Option<(Vec<u8>, Option<String>)> = self
            .conn
            .prepare_cached("SELECT data, checksum FROM kv_store WHERE key = ?1")?
            .query_row(params![self.key], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;

        let Some((data, stored_checksum)) = row else {
            return Ok(Vec::new());
        };

        if self.checksum_enabled {
            if let Some(expected) = stored_checksum {
                let actual = crc32_hex(&data);
                if expected != actual {
                    warn!(
                        key = %self.key,
                        expected = %expected,
                        actual = %actual,
                        "Checksum mismatch, stored contacts may be corrupted"
                    );
                }
            }
        }

        decode_contacts(&data)
    }

    /// Copy the database to `dest_path` using SQLite's online-backup API.
    ///
    /// # Errors
    ///
    /// Returns [`RolodexError::Database`] on SQLite failures.
    pub fn backup<P: AsRef<Path>>(&self, dest_path: P) -> Result<()> {
        let start = Instant::now();
        let mut dest = Connection::open(dest_path.as_ref())?;
        let backup = rusqlite::backup::Backup::new(&self.conn, &mut dest)?;
        backup.run_to_completion(256, std::time::Duration::from_millis(50), None)?;

        info!(
            dest = %dest_path.as_ref().display(),
            elapsed_ms = start.elapsed().as_millis(),
            "Database backup completed"
        );
        Ok(())
    }

    /// `Ok(true)` if `PRAGMA integrity_check` reports no corruption.
    ///
    /// # Errors
    ///
    /// Returns [`RolodexError::Database`] if the check itself fails.
    pub fn integrity_check(&self) -> Result<bool> {
        let result: String = self
            .conn
            .query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        Ok(result == "ok")
    }

    /// Path to the database file (or `:memory:`).
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

impl ContactStore for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn save(&self, contacts: &[Contact]) -> Result<()> {
        let start = Instant::now();
        let bytes = self.try_save(contacts).map_err(RolodexError::write)?;
        debug!(
            key = %self.key,
            contacts = contacts.len(),
            bytes,
            elapsed_us = start.elapsed().as_micros(),
            "Saved contacts"
        );
        Ok(())
    }

    fn load(&self) -> Vec<Contact> {
        let start = Instant::now();
        match self.try_load() {
            Ok(contacts) => {
                debug!(
                    key = %self.key,
                    contacts = contacts.len(),
                    elapsed_us = start.elapsed().as_micros(),
                    "Loaded contacts"
                );
                contacts
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Could not load contacts, starting empty");
                Vec::new()
            }
        }
    }

    fn clear(&self) {
        match self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![self.key])
        {
            Ok(_) => info!(key = %self.key, "Cleared stored contacts"),
            Err(e) => warn!(key = %self.key, error = %e, "Failed to clear stored contacts"),
        }
    }
}
