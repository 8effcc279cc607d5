use redb::{Database, ReadableTable};
use std::path::Path;
use std::sync::Arc;

use super::{tables, KvStore, Mutator, StoreResult};

/// Durable profile backed by a single redb table
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create the redb database at the given path
    ///
    /// Creates the profile table on first run.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        tracing::info!("Opening profile database at: {:?}", path.as_ref());

        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    tracing::error!("Failed to create database directory: {}", e);
                    e
                })?;
            }
        }

        let db = Database::create(path)?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(tables::PROFILE)?;
        }
        write_txn.commit()?;

        tracing::info!("Profile database initialized successfully");

        Ok(Self { db: Arc::new(db) })
    }
}

impl KvStore for RedbStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(tables::PROFILE)?;
        let value = table.get(key)?.map(|v| v.value().to_vec());
        Ok(value)
    }

    fn set(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(tables::PROFILE)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(tables::PROFILE)?;
            table.remove(key)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    // redb admits one write transaction at a time, so holding it across the
    // read and the write serializes every update on this database.
    fn update(&self, key: &str, mutate: &mut Mutator<'_>) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        let written = {
            let mut table = write_txn.open_table(tables::PROFILE)?;
            let current = table.get(key)?.map(|v| v.value().to_vec());

            match mutate(current.as_deref()) {
                Ok(Some(bytes)) => {
                    table.insert(key, bytes.as_slice())?;
                    Ok(true)
                }
                Ok(None) => Ok(false),
                Err(e) => Err(e),
            }
        };

        match written {
            Ok(true) => {
                write_txn.commit()?;
                Ok(())
            }
            Ok(false) => {
                write_txn.abort()?;
                Ok(())
            }
            Err(e) => {
                write_txn.abort()?;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_values_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("profile.db");

        {
            let store = RedbStore::open(&path).unwrap();
            store.set("registeredUsers", b"[]").unwrap();
        }

        let store = RedbStore::open(&path).unwrap();
        assert_eq!(
            store.get("registeredUsers").unwrap().as_deref(),
            Some(&b"[]"[..])
        );
    }

    #[test]
    fn test_failed_update_leaves_value_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let store = RedbStore::open(temp_dir.path().join("profile.db")).unwrap();
        store.set("adminTools", b"[1]").unwrap();

        let result = store.update("adminTools", &mut |_| {
            Err(crate::store::StoreError::Poisoned)
        });
        assert!(result.is_err());
        assert_eq!(store.get("adminTools").unwrap().as_deref(), Some(&b"[1]"[..]));
    }
}
