//! Key-value persistence for JSON blobs.

use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use chrono::Utc;
use rusqlite::{OptionalExtension, params};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub trait KvBackend {
    fn load(&mut self, key: &str) -> AppResult<Option<String>>;

    fn save(&mut self, key: &str, blob: &str) -> AppResult<()>;

    /// True when another execution context wrote to the store since the last call.
    fn changed_externally(&mut self) -> AppResult<bool>;

    /// Append a line to the internal audit log, when the backend keeps one.
    fn audit(&mut self, _operation: &str, _target: &str, _message: &str) -> AppResult<()> {
        Ok(())
    }
}

/// SQLite-backed store. `PRAGMA data_version` only moves when *another*
/// connection commits, which is exactly the cross-context change signal.
pub struct SqliteKv {
    pool: DbPool,
    seen_version: i64,
}

impl SqliteKv {
    pub fn open(pool: DbPool) -> AppResult<Self> {
        let seen_version = data_version(&pool)?;
        Ok(Self { pool, seen_version })
    }
}

fn data_version(pool: &DbPool) -> AppResult<i64> {
    Ok(pool
        .conn
        .query_row("PRAGMA data_version;", [], |row| row.get(0))?)
}

impl KvBackend for SqliteKv {
    fn load(&mut self, key: &str) -> AppResult<Option<String>> {
        let value = self
            .pool
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn save(&mut self, key: &str, blob: &str) -> AppResult<()> {
        let mut stmt = self.pool.conn.prepare_cached(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )?;
        stmt.execute(params![key, blob, Utc::now().to_rfc3339()])?;
        Ok(())
    }

    fn changed_externally(&mut self) -> AppResult<bool> {
        let current = data_version(&self.pool)?;
        let changed = current != self.seen_version;
        self.seen_version = current;
        Ok(changed)
    }

    fn audit(&mut self, operation: &str, target: &str, message: &str) -> AppResult<()> {
        ttlog(&self.pool.conn, operation, target, message)
    }
}

/// In-memory store. Clones share the same map; a write through one handle is
/// reported as an external change by every other handle.
#[derive(Clone, Default)]
pub struct MemoryKv {
    shared: Rc<RefCell<MemoryInner>>,
    seen_version: u64,
}

#[derive(Default)]
struct MemoryInner {
    values: HashMap<String, String>,
    version: u64,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvBackend for MemoryKv {
    fn load(&mut self, key: &str) -> AppResult<Option<String>> {
        Ok(self.shared.borrow().values.get(key).cloned())
    }

    fn save(&mut self, key: &str, blob: &str) -> AppResult<()> {
        let mut inner = self.shared.borrow_mut();
        inner.values.insert(key.to_string(), blob.to_string());
        inner.version += 1;
        // our own write is not an external change
        self.seen_version = inner.version;
        Ok(())
    }

    fn changed_externally(&mut self) -> AppResult<bool> {
        let version = self.shared.borrow().version;
        let changed = version != self.seen_version;
        self.seen_version = version;
        Ok(changed)
    }
}
