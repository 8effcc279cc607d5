use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::FOLDER_MEDIA_TYPE;

/// Synthetic record id: epoch milliseconds plus a random fraction.
///
/// Collisions are unlikely but possible; lookups take the first match.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub f64);

impl FileId {
    pub fn generate(now: DateTime<Utc>) -> Self {
        let fraction: f64 = rand::thread_rng().gen();
        Self(now.timestamp_millis() as f64 + fraction)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FileId {
    type Err = std::num::ParseFloatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(FileId)
    }
}

/// A file as picked by the user, before it is accepted into a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub name: String,
    /// Declared size in bytes
    pub size: u64,
    /// Client-reported media type, unverified
    #[serde(rename = "type", default)]
    pub media_type: String,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            media_type: String::new(),
        }
    }

    /// Lower-cased text after the final `.`; empty when the name has no `.`
    pub fn extension(&self) -> String {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default()
    }
}

/// One file inside an uploaded folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderEntry {
    pub name: String,
    pub size: u64,
    /// Path relative to the picked directory, e.g. `pack/bin/tool.exe`
    pub path: String,
}

impl FolderEntry {
    /// First path segment, which names the folder this entry belongs to
    pub fn folder_name(&self) -> &str {
        self.path.split('/').next().unwrap_or_default()
    }
}

/// Contents carried by folder records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderContents {
    pub file_count: usize,
    pub total_size: u64,
    pub files: Vec<FolderEntry>,
}

impl FolderContents {
    /// Build folder contents. Sizes are client-declared, so an overflowing
    /// total saturates; callers reject such folders with `checked_total`.
    pub fn new(files: Vec<FolderEntry>) -> Self {
        Self {
            file_count: files.len(),
            total_size: files.iter().fold(0u64, |total, f| total.saturating_add(f.size)),
            files,
        }
    }

    /// Sum of the entry sizes, or `None` if it does not fit in a `u64`
    pub fn checked_total(files: &[FolderEntry]) -> Option<u64> {
        files.iter().try_fold(0u64, |total, f| total.checked_add(f.size))
    }

    /// Group a directory pick by top-level folder, keeping first-seen order
    pub fn group(entries: Vec<FolderEntry>) -> Vec<(String, Vec<FolderEntry>)> {
        let mut groups: Vec<(String, Vec<FolderEntry>)> = Vec::new();
        for entry in entries {
            let name = entry.folder_name().to_string();
            match groups.iter_mut().find(|(existing, _)| *existing == name) {
                Some((_, files)) => files.push(entry),
                None => groups.push((name, vec![entry])),
            }
        }
        groups
    }
}

/// What an upload action hands to the registry
#[derive(Debug, Clone, PartialEq)]
pub enum Upload {
    File(FileDescriptor),
    Folder { name: String, files: Vec<FolderEntry> },
}

impl Upload {
    pub fn name(&self) -> &str {
        match self {
            Upload::File(file) => &file.name,
            Upload::Folder { name, .. } => name,
        }
    }
}

/// File or folder metadata as persisted in a category partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: FileId,
    pub name: String,
    /// Declared size in bytes; the aggregate size for folders
    #[serde(default)]
    pub size: u64,
    /// Client-declared media type, or "folder"
    #[serde(rename = "type", default)]
    pub media_type: String,
    pub category: String,
    pub upload_date: DateTime<Utc>,
    #[serde(default)]
    pub download_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_by: Option<String>,
    #[serde(flatten)]
    pub folder: Option<FolderContents>,
}

impl FileRecord {
    /// Build a fresh record with a new id and a zeroed download counter
    pub fn new(upload: Upload, category: &str, uploaded_by: Option<String>) -> Self {
        let now = Utc::now();
        let (name, size, media_type, folder) = match upload {
            Upload::File(file) => (file.name, file.size, file.media_type, None),
            Upload::Folder { name, files } => {
                let contents = FolderContents::new(files);
                (
                    name,
                    contents.total_size,
                    FOLDER_MEDIA_TYPE.to_string(),
                    Some(contents),
                )
            }
        };

        Self {
            id: FileId::generate(now),
            name,
            size,
            media_type,
            category: category.to_string(),
            upload_date: now,
            download_count: 0,
            uploaded_by,
            folder,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.folder.is_some()
    }
}

/// Format bytes the way the dashboards display them ("1.5 MB")
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    let (value, unit) = if bytes >= GB {
        (bytes as f64 / GB as f64, "GB")
    } else if bytes >= MB {
        (bytes as f64 / MB as f64, "MB")
    } else if bytes >= KB {
        (bytes as f64 / KB as f64, "KB")
    } else {
        return format!("{} Bytes", bytes);
    };

    // Round to two decimals, then drop trailing zeros
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, unit)
}
