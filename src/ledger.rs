use std::sync::Arc;

use crate::constants::LEDGER_CAPACITY;
use crate::error::Result;
use crate::models::DownloadEntry;
use crate::store::{load_collection, modify_collection, tables, Change, KvStore};

/// Capped download history, most recent first
pub struct DownloadLedger {
    store: Arc<dyn KvStore>,
    capacity: usize,
}

impl DownloadLedger {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self::with_capacity(store, LEDGER_CAPACITY)
    }

    pub fn with_capacity(store: Arc<dyn KvStore>, capacity: usize) -> Self {
        Self { store, capacity }
    }

    pub fn append(&self, entry: DownloadEntry) -> Result<()> {
        let capacity = self.capacity;
        modify_collection(self.store.as_ref(), tables::DOWNLOAD_HISTORY, |entries: &mut Vec<DownloadEntry>| {
            entries.insert(0, entry);
            entries.truncate(capacity);
            Change::Modified(())
        })?;
        Ok(())
    }

    pub fn recent(&self, limit: usize) -> Result<Vec<DownloadEntry>> {
        let mut entries = self.all()?;
        entries.truncate(limit);
        Ok(entries)
    }

    pub fn all(&self) -> Result<Vec<DownloadEntry>> {
        Ok(load_collection(self.store.as_ref(), tables::DOWNLOAD_HISTORY)?)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.all()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
