//! redb-based key-value store for lounge state
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `kv` | `&str` | JSON bytes | Lounge counters and equipment list |
//!
//! # Durability
//!
//! Best effort. The store is a convenience for surviving restarts, not a
//! transactional record: [`LocalStore::read`] falls back to the caller's
//! default and [`LocalStore::write`] swallows failures after logging them.
//! The `try_*` variants expose the underlying errors.

use redb::{Database, ReadableDatabase, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for lounge values: key = logical key, value = JSON-serialized value
const KV_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store is disabled")]
    Disabled,
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Which backend a [`LocalStore`] ended up on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    File,
    Memory,
    Disabled,
}

/// Lounge key-value store backed by redb
#[derive(Clone)]
pub struct LocalStore {
    db: Option<Arc<Database>>,
    backend: StoreBackend,
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore")
            .field("backend", &self.backend)
            .finish()
    }
}

impl LocalStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db, StoreBackend::File)
    }

    /// Open an in-memory database (lost on exit)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db, StoreBackend::Memory)
    }

    /// A store with no backend: reads return defaults, writes do nothing
    pub fn disabled() -> Self {
        Self {
            db: None,
            backend: StoreBackend::Disabled,
        }
    }

    /// Open the file store, degrading to memory and then to a disabled store.
    ///
    /// Never fails; each degradation is logged.
    pub fn open_or_fallback(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::open(path) {
            Ok(store) => {
                tracing::info!(path = %path.display(), "Lounge store opened");
                store
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to open lounge store, state will not survive restarts");
                match Self::open_in_memory() {
                    Ok(store) => store,
                    Err(e) => {
                        tracing::warn!(error = %e, "In-memory store unavailable, persistence disabled");
                        Self::disabled()
                    }
                }
            }
        }
    }

    fn init(db: Database, backend: StoreBackend) -> StorageResult<Self> {
        // Create the table up front so read transactions never miss it
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(KV_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self {
            db: Some(Arc::new(db)),
            backend,
        })
    }

    pub fn backend(&self) -> StoreBackend {
        self.backend
    }

    fn db(&self) -> StorageResult<&Database> {
        self.db.as_deref().ok_or(StorageError::Disabled)
    }

    // ========== Fallible Operations ==========

    /// Read and deserialize the value under `key`
    pub fn try_read<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let read_txn = self.db()?.begin_read()?;
        let table = read_txn.open_table(KV_TABLE)?;

        match table.get(key)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Serialize and persist `value` under `key`
    pub fn try_write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let bytes = serde_json::to_vec(value)?;
        let write_txn = self.db()?.begin_write()?;
        {
            let mut table = write_txn.open_table(KV_TABLE)?;
            table.insert(key, bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Remove the value under `key` (no error if absent)
    pub fn remove(&self, key: &str) -> StorageResult<()> {
        let write_txn = self.db()?.begin_write()?;
        {
            let mut table = write_txn.open_table(KV_TABLE)?;
            table.remove(key)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    // ========== Best-effort Operations ==========

    /// Read `key`, returning `default` when absent, malformed or unavailable
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.try_read(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(StorageError::Disabled) => default,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Stored value unreadable, using default");
                default
            }
        }
    }

    /// Persist `value` under `key`, logging and swallowing any failure
    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match self.try_write(key, value) {
            Ok(()) | Err(StorageError::Disabled) => {}
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to persist value, keeping in memory only");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing_returns_default() {
        let store = LocalStore::open_in_memory().unwrap();
        assert_eq!(store.read("peopleInside", 0u32), 0);
        assert!(store.try_read::<u32>("peopleInside").unwrap().is_none());
    }

    #[test]
    fn test_write_then_read() {
        let store = LocalStore::open_in_memory().unwrap();
        store.write("totalEntries", &17u64);
        assert_eq!(store.read("totalEntries", 0u64), 17);

        // Overwrite
        store.write("totalEntries", &18u64);
        assert_eq!(store.read("totalEntries", 0u64), 18);
    }

    #[test]
    fn test_malformed_value_falls_back() {
        let store = LocalStore::open_in_memory().unwrap();
        store.write("peopleInside", "not a number");
        assert!(store.try_read::<u32>("peopleInside").is_err());
        assert_eq!(store.read("peopleInside", 3u32), 3);

        // Negative counts can't be represented as u32 either
        store.write("peopleInside", &-2i64);
        assert_eq!(store.read("peopleInside", 0u32), 0);
    }

    #[test]
    fn test_disabled_store_is_inert() {
        let store = LocalStore::disabled();
        assert_eq!(store.backend(), StoreBackend::Disabled);
        store.write("peopleInside", &5u32);
        assert_eq!(store.read("peopleInside", 0u32), 0);
        assert!(matches!(store.try_write("k", &1u8), Err(StorageError::Disabled)));
    }

    #[test]
    fn test_remove() {
        let store = LocalStore::open_in_memory().unwrap();
        store.write("equipment", &vec![1, 2, 3]);
        store.remove("equipment").unwrap();
        assert!(store.try_read::<Vec<i32>>("equipment").unwrap().is_none());

        // 删除不存在的键不应报错
        store.remove("nonexistent").unwrap();
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lounge.redb");
        {
            let store = LocalStore::open(&path).unwrap();
            assert_eq!(store.backend(), StoreBackend::File);
            store.write("peopleInside", &4u32);
        }
        let store = LocalStore::open(&path).unwrap();
        assert_eq!(store.read("peopleInside", 0u32), 4);
    }

    #[test]
    fn test_open_or_fallback_degrades_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        // Parent directory does not exist, so the file can't be created
        let path = dir.path().join("missing").join("lounge.redb");
        let store = LocalStore::open_or_fallback(&path);
        assert_eq!(store.backend(), StoreBackend::Memory);
        store.write("peopleInside", &1u32);
        assert_eq!(store.read("peopleInside", 0u32), 1);
    }
}
