//! SQLite-backed persistence port.
//!
//! One table, one row per record key. Each value is the whole serialized
//! record, replaced on every write, which matches the core's write-through
//! contract.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use kotoba_core::StorageBackend;

pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS records (
                key   TEXT PRIMARY KEY,
                value BLOB NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl StorageBackend for SqliteStorage {
    fn load(&self, key: &str) -> Option<Vec<u8>> {
        let conn = self.conn.lock().expect("db lock");
        let result = conn
            .query_row(
                "SELECT value FROM records WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional();
        match result {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, %err, "failed to read record");
                None
            }
        }
    }

    fn save(&self, key: &str, bytes: &[u8]) {
        let conn = self.conn.lock().expect("db lock");
        if let Err(err) = conn.execute(
            "INSERT INTO records (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, bytes],
        ) {
            tracing::warn!(key, %err, "failed to write record");
        }
    }
}
