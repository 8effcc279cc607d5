use serde::Serialize;
use std::sync::Arc;

use super::config::{Capability, CategoryRule, DashboardConfig};
use crate::error::{AppError, NotFound, Result};
use crate::models::{FileDescriptor, FileId, FileRecord, Upload};
use crate::store::{load_collection, modify_collection, Change, KvStore};

/// Records of one category, in storage order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryListing {
    pub category: &'static str,
    pub files: Vec<FileRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub total_files: usize,
    pub total_downloads: u64,
    pub total_bytes: u64,
}

/// File metadata partitions of one dashboard
#[derive(Clone)]
pub struct FileRegistry {
    store: Arc<dyn KvStore>,
    config: DashboardConfig,
}

impl FileRegistry {
    pub fn new(store: Arc<dyn KvStore>, config: DashboardConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn rule(&self, category: &str) -> Result<&'static CategoryRule> {
        self.config
            .category(category)
            .ok_or_else(|| AppError::UnknownCategory {
                variant: self.config.variant,
                category: category.to_string(),
            })
    }

    /// Fail unless this dashboard offers `capability`
    pub fn require(&self, capability: Capability) -> Result<()> {
        if self.config.capabilities.allows(capability) {
            Ok(())
        } else {
            Err(AppError::NotPermitted {
                variant: self.config.variant,
                action: capability.as_str(),
            })
        }
    }

    pub fn validate(&self, file: &FileDescriptor, category: &str) -> Result<()> {
        self.rule(category)?.check(file)?;
        Ok(())
    }

    /// Build the record an upload will become, without persisting it
    pub fn prepare(&self, upload: Upload, category: &str, uploader: Option<&str>) -> Result<FileRecord> {
        let rule = self.rule(category)?;
        let uploaded_by = uploader
            .filter(|_| self.config.stamps_uploader)
            .map(str::to_string);

        Ok(FileRecord::new(upload, rule.name, uploaded_by))
    }

    /// Append a prepared record to its category
    pub fn commit(&self, record: FileRecord) -> Result<FileRecord> {
        let rule = self.rule(&record.category)?;

        modify_collection(self.store.as_ref(), rule.storage_key, |records: &mut Vec<FileRecord>| {
            records.push(record.clone());
            Change::Modified(())
        })?;

        tracing::info!(
            "Stored {} in {}/{} ({} bytes)",
            record.name,
            self.config.variant,
            record.category,
            record.size
        );
        Ok(record)
    }

    pub fn ingest(&self, upload: Upload, category: &str, uploader: Option<&str>) -> Result<FileRecord> {
        let record = self.prepare(upload, category, uploader)?;
        self.commit(record)
    }

    /// Remove the first record with `id`. Returns the removed record.
    pub fn delete(&self, id: FileId, category: &str) -> Result<FileRecord> {
        let rule = self.rule(category)?;

        let removed = modify_collection(self.store.as_ref(), rule.storage_key, |records: &mut Vec<FileRecord>| {
            match records.iter().position(|r| r.id == id) {
                Some(index) => Change::Modified(Some(records.remove(index))),
                None => Change::Unchanged(None),
            }
        })?;

        let record = removed.ok_or_else(|| NotFound {
            id,
            category: rule.name.to_string(),
        })?;

        tracing::info!("Deleted {} from {}/{}", record.name, self.config.variant, rule.name);
        Ok(record)
    }

    /// Bump the download counter of the first record with `id`
    pub fn record_download(&self, id: FileId, category: &str) -> Result<FileRecord> {
        let rule = self.rule(category)?;

        let updated = modify_collection(self.store.as_ref(), rule.storage_key, |records: &mut Vec<FileRecord>| {
            match records.iter_mut().find(|r| r.id == id) {
                Some(record) => {
                    record.download_count += 1;
                    Change::Modified(Some(record.clone()))
                }
                None => Change::Unchanged(None),
            }
        })?;

        updated.ok_or_else(|| {
            NotFound {
                id,
                category: rule.name.to_string(),
            }
            .into()
        })
    }

    pub fn list(&self, category: &str) -> Result<Vec<FileRecord>> {
        let rule = self.rule(category)?;
        Ok(load_collection(self.store.as_ref(), rule.storage_key)?)
    }

    pub fn list_all(&self) -> Result<Vec<CategoryListing>> {
        self.config
            .categories
            .iter()
            .map(|rule| {
                Ok(CategoryListing {
                    category: rule.name,
                    files: load_collection(self.store.as_ref(), rule.storage_key)?,
                })
            })
            .collect()
    }

    pub fn stats(&self) -> Result<RegistryStats> {
        let mut stats = RegistryStats::default();
        for listing in self.list_all()? {
            stats.total_files += listing.files.len();
            for record in &listing.files {
                stats.total_downloads = stats.total_downloads.saturating_add(record.download_count);
                stats.total_bytes = stats.total_bytes.saturating_add(record.size);
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MIB;
    use crate::error::ValidationError;
    use crate::files::DashboardVariant;
    use crate::models::FolderEntry;
    use crate::store::MemoryStore;

    fn registries() -> (FileRegistry, FileRegistry, FileRegistry) {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        (
            FileRegistry::new(store.clone(), DashboardConfig::admin()),
            FileRegistry::new(store.clone(), DashboardConfig::generic()),
            FileRegistry::new(store, DashboardConfig::viewer()),
        )
    }

    fn upload(name: &str, size: u64) -> Upload {
        Upload::File(FileDescriptor::new(name, size))
    }

    #[test]
    fn test_batch_rejects_only_the_oversized_file() {
        let (admin, _, _) = registries();
        let picked = vec![
            FileDescriptor::new("small.cfg", 1024),
            FileDescriptor::new("huge.cfg", 60 * MIB),
            FileDescriptor::new("game.ini", 2048),
        ];

        let mut rejected = Vec::new();
        for file in picked {
            match admin.validate(&file, "settings") {
                Ok(()) => {
                    admin.ingest(Upload::File(file), "settings", Some("alice")).unwrap();
                }
                Err(e) => rejected.push(e),
            }
        }

        assert_eq!(rejected.len(), 1);
        assert!(matches!(
            &rejected[0],
            AppError::Validation(ValidationError::TooLarge { file, .. }) if file == "huge.cfg"
        ));
        let names: Vec<String> = admin.list("settings").unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["small.cfg", "game.ini"]);
    }

    #[test]
    fn test_unknown_category() {
        let (admin, generic, _) = registries();
        assert!(matches!(
            admin.validate(&FileDescriptor::new("a.apk", 1), "apk"),
            Err(AppError::UnknownCategory {
                variant: DashboardVariant::Admin,
                ..
            })
        ));
        assert!(generic.validate(&FileDescriptor::new("a.apk", 1), "apk").is_ok());
    }

    #[test]
    fn test_uploader_stamped_only_on_admin() {
        let (admin, generic, _) = registries();
        let a = admin.ingest(upload("tool.sh", 10), "tools", Some("alice")).unwrap();
        let g = generic.ingest(upload("game.apk", 10), "apk", Some("alice")).unwrap();

        assert_eq!(a.uploaded_by.as_deref(), Some("alice"));
        assert_eq!(g.uploaded_by, None);
    }

    #[test]
    fn test_viewer_reads_admin_partitions() {
        let (admin, _, viewer) = registries();
        let record = admin.ingest(upload("emu.apk", 10), "emulator", Some("alice")).unwrap();

        let seen = viewer.list("emulator").unwrap();
        assert_eq!(seen, vec![record]);
    }

    #[test]
    fn test_delete_then_repeat_is_not_found() {
        let (_, generic, _) = registries();
        let record = generic.ingest(upload("setup.exe", 10), "exe", None).unwrap();

        generic.delete(record.id, "exe").unwrap();
        assert!(generic.list("exe").unwrap().is_empty());
        assert!(matches!(
            generic.delete(record.id, "exe"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_record_download_increments() {
        let (_, generic, _) = registries();
        let record = generic.ingest(upload("game.apk", 10), "apk", None).unwrap();

        generic.record_download(record.id, "apk").unwrap();
        let updated = generic.record_download(record.id, "apk").unwrap();
        assert_eq!(updated.download_count, 2);
        assert_eq!(generic.list("apk").unwrap()[0].download_count, 2);

        assert!(matches!(
            generic.record_download(FileId(1.25), "apk"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_folder_ingest_skips_validation() {
        let (admin, _, _) = registries();
        let files = vec![FolderEntry {
            name: "readme.md".to_string(),
            size: 5000 * MIB,
            path: "pack/readme.md".to_string(),
        }];
        let record = admin
            .ingest(
                Upload::Folder {
                    name: "pack".to_string(),
                    files,
                },
                "settings",
                Some("alice"),
            )
            .unwrap();

        assert!(record.is_folder());
        assert_eq!(admin.list("settings").unwrap().len(), 1);
    }

    #[test]
    fn test_stats() {
        let (_, generic, _) = registries();
        let apk = generic.ingest(upload("game.apk", 100), "apk", None).unwrap();
        generic.ingest(upload("setup.exe", 50), "exe", None).unwrap();
        generic.record_download(apk.id, "apk").unwrap();

        assert_eq!(
            generic.stats().unwrap(),
            RegistryStats {
                total_files: 2,
                total_downloads: 1,
                total_bytes: 150,
            }
        );
    }

    #[test]
    fn test_stats_saturate_on_huge_folders() {
        let (admin, _, _) = registries();
        for name in ["left", "right"] {
            let files = vec![FolderEntry {
                name: "blob.bin".to_string(),
                size: u64::MAX,
                path: format!("{}/blob.bin", name),
            }];
            admin
                .ingest(
                    Upload::Folder {
                        name: name.to_string(),
                        files,
                    },
                    "tools",
                    Some("alice"),
                )
                .unwrap();
        }

        let stats = admin.stats().unwrap();
        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.total_bytes, u64::MAX);
    }

    #[test]
    fn test_require_capability() {
        let (admin, generic, viewer) = registries();
        assert!(admin.require(Capability::Upload).is_ok());
        assert!(admin.require(Capability::Download).is_err());
        assert!(generic.require(Capability::Download).is_ok());
        assert!(matches!(
            viewer.require(Capability::Upload),
            Err(AppError::NotPermitted { action: "upload", .. })
        ));
    }
}
