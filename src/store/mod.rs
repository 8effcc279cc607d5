//! Flat string-keyed profile storage.
//!
//! Every piece of persistent state (users, session, file partitions, download
//! history) lives under one key as JSON text. Callers never reach for a global:
//! a single [`KvStore`] is built at the composition root and shared by `Arc`.

mod memory;
mod redb_store;
pub mod tables;

pub use self::memory::MemoryStore;
pub use self::redb_store::RedbStore;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Storage error type
#[derive(Error, Debug)]
pub enum StoreError {
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

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed value under '{key}': {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Read-modify-write callback handed to [`KvStore::update`].
///
/// Receives the current bytes (if any) and returns the bytes to write back,
/// or `None` to leave the key untouched.
pub type Mutator<'a> = dyn FnMut(Option<&[u8]>) -> StoreResult<Option<Vec<u8>>> + 'a;

/// Key/value storage backing a single profile
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    fn set(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Atomic read-modify-write of one key.
    ///
    /// No other writer can observe or change the key between the read handed
    /// to `mutate` and the write of its result.
    fn update(&self, key: &str, mutate: &mut Mutator<'_>) -> StoreResult<()>;
}

/// Outcome of a collection mutation
pub enum Change<R> {
    /// Nothing changed; skip the write
    Unchanged(R),
    /// The collection was modified and must be persisted
    Modified(R),
}

fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> StoreResult<T> {
    serde_json::from_slice(bytes).map_err(|source| StoreError::Malformed {
        key: key.to_string(),
        source,
    })
}

/// Load a JSON array stored under `key`; a missing key is an empty collection.
pub fn load_collection<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> StoreResult<Vec<T>> {
    match store.get(key)? {
        Some(bytes) => decode(key, &bytes),
        None => Ok(Vec::new()),
    }
}

/// Atomically mutate the JSON array stored under `key`.
pub fn modify_collection<T, R, F>(store: &dyn KvStore, key: &str, f: F) -> StoreResult<R>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce(&mut Vec<T>) -> Change<R>,
{
    let mut f = Some(f);
    let mut output = None;

    store.update(key, &mut |current| {
        let mut items: Vec<T> = match current {
            Some(bytes) => decode(key, bytes)?,
            None => Vec::new(),
        };

        let Some(f) = f.take() else {
            return Ok(None);
        };

        match f(&mut items) {
            Change::Unchanged(result) => {
                output = Some(result);
                Ok(None)
            }
            Change::Modified(result) => {
                output = Some(result);
                Ok(Some(serde_json::to_vec(&items)?))
            }
        }
    })?;

    output.ok_or(StoreError::Poisoned)
}

/// Load a single JSON value stored under `key`
pub fn load_value<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> StoreResult<Option<T>> {
    store.get(key)?.map(|bytes| decode(key, &bytes)).transpose()
}

/// Store a single JSON value under `key`
pub fn save_value<T: Serialize>(store: &dyn KvStore, key: &str, value: &T) -> StoreResult<()> {
    let bytes = serde_json::to_vec(value)?;
    store.set(key, &bytes)
}
