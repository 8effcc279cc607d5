use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{KvStore, Mutator, StoreError, StoreResult};

/// In-process profile store, used for tests and ephemeral profiles
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> StoreResult<MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.entries.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.entries()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries()?.remove(key);
        Ok(())
    }

    fn update(&self, key: &str, mutate: &mut Mutator<'_>) -> StoreResult<()> {
        let mut entries = self.entries()?;
        if let Some(bytes) = mutate(entries.get(key).map(Vec::as_slice))? {
            entries.insert(key.to_string(), bytes);
        }
        Ok(())
    }
}
