//! SQLite implementation of the StorageBackend trait.
//!
//! Uses rusqlite with bundled SQLite, wrapped in async via
//! `tokio::task::spawn_blocking`. Fragments are stored in their persisted
//! JSON form, so a database file can be read by any implementation of the
//! format.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use scopevault_core::{Fragment, SeedId};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::StorageBackend;

/// SQLite-based backend.
///
/// Thread-safe via internal Mutex.
pub struct SqliteBackend {
    name: String,
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBackend {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if needed. The backend is named
    /// after the path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            name: format!("sqlite:{}", path.display()),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            name: "sqlite::memory:".to_string(),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Rename the backend for reporting.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Run `f` against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn)?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("spawn_blocking failed: {}", e)))?
    }

    /// Number of stored fragments.
    pub async fn count(&self) -> Result<u64> {
        self.blocking(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM fragments", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock().map_err(|e| {
        StoreError::Database(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
            Some(format!("mutex poisoned: {}", e)),
        ))
    })
}

#[async_trait]
impl StorageBackend for SqliteBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put(&self, seed_id: &SeedId, index: u32, fragment: &Fragment) -> Result<()> {
        if fragment.index != index {
            return Err(StoreError::InvalidData(format!(
                "fragment {} stored at index {}",
                fragment.index, index
            )));
        }

        let body = fragment
            .to_json()
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let seed_id = seed_id.as_str().to_string();

        self.blocking(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO fragments (seed_id, fragment_index, body, stored_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![seed_id, index, body, chrono::Utc::now().timestamp_millis()],
            )?;
            Ok(())
        })
        .await
    }

    async fn get(&self, seed_id: &SeedId, index: u32) -> Result<Fragment> {
        let key = seed_id.as_str().to_string();

        let body: Option<String> = self
            .blocking(move |conn| {
                Ok(conn
                    .query_row(
                        "SELECT body FROM fragments WHERE seed_id = ?1 AND fragment_index = ?2",
                        params![key, index],
                        |row| row.get(0),
                    )
                    .optional()?)
            })
            .await?;

        let body = body.ok_or_else(|| StoreError::NotFound {
            seed_id: seed_id.to_string(),
            index,
        })?;

        let fragment =
            Fragment::from_json(&body).map_err(|e| StoreError::Serialization(e.to_string()))?;
        if fragment.index != index || &fragment.metadata.seed_id != seed_id {
            return Err(StoreError::InvalidData(format!(
                "row {}/{} holds fragment {}/{}",
                seed_id, index, fragment.metadata.seed_id, fragment.index
            )));
        }
        Ok(fragment)
    }
}
