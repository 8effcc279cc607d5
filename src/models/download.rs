use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FileRecord;

/// One line of the download history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadEntry {
    /// Download time in epoch milliseconds
    pub id: i64,
    pub file_name: String,
    pub category: String,
    pub download_date: DateTime<Utc>,
    pub file_size: u64,
}

impl DownloadEntry {
    pub fn for_record(record: &FileRecord, now: DateTime<Utc>) -> Self {
        Self {
            id: now.timestamp_millis(),
            file_name: record.name.clone(),
            category: record.category.clone(),
            download_date: now,
            file_size: record.size,
        }
    }
}
