//! Composition root. Every dashboard or auth action is one `Portal` method.

use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::constants::{ADMIN_LANDING, RECENT_DOWNLOADS_SHOWN, VIEWER_LANDING};
use crate::credentials::CredentialStore;
use crate::error::{AppError, Result};
use crate::events::{EventBus, PortalEvent};
use crate::files::{
    Capability, CategoryListing, DashboardConfig, DashboardVariant, FileRegistry,
};
use crate::ledger::DownloadLedger;
use crate::models::{
    format_file_size, DownloadEntry, FileDescriptor, FileId, FileRecord, FolderContents,
    FolderEntry, Role, Session, Upload, User, UserSummary,
};
use crate::security::PasswordHasher;
use crate::session::{AuthPhase, SessionState};
use crate::store::{KvStore, MemoryStore, RedbStore, StoreResult};
use crate::transfer::{run_transfer, Immediate, TransferKind, TransferTimer};
use crate::users::{RegistrationRequest, RoleLimits, UserRegistry};

/// Tunables that differ between deployments
#[derive(Debug, Clone)]
pub struct PortalOptions {
    pub limits: RoleLimits,
    pub hasher: PasswordHasher,
    pub credentials: CredentialStore,
}

impl Default for PortalOptions {
    fn default() -> Self {
        Self {
            limits: RoleLimits::default(),
            hasher: PasswordHasher::Rolling,
            credentials: CredentialStore::default(),
        }
    }
}

/// Successful login and where to send the user next
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginOutcome {
    pub session: Session,
    pub redirect: &'static str,
}

/// A file refused during validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub file: String,
    pub reason: String,
}

/// What happened to each file of one upload action
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    /// Pending records, one per accepted file or folder
    pub accepted: Vec<FileRecord>,
    pub rejected: Vec<Rejection>,
}

/// An upload action in flight
pub struct UploadBatch {
    pub report: BatchReport,
    pub transfers: Vec<JoinHandle<Result<FileRecord>>>,
}

impl UploadBatch {
    /// Wait for every transfer, returning the stored records in submission order
    pub async fn finish(self) -> Result<Vec<FileRecord>> {
        let mut stored = Vec::with_capacity(self.transfers.len());
        for transfer in self.transfers {
            stored.push(transfer.await??);
        }
        Ok(stored)
    }
}

/// Figures shown on a dashboard's stats panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_files: usize,
    pub total_downloads: u64,
    pub total_users: usize,
    pub my_downloads: usize,
    pub total_bytes: u64,
    pub total_size: String,
}

pub struct Portal {
    users: UserRegistry,
    session: SessionState,
    ledger: DownloadLedger,
    dashboards: HashMap<DashboardVariant, FileRegistry>,
    timer: Arc<dyn TransferTimer>,
    events: EventBus,
}

impl Portal {
    pub fn new(store: Arc<dyn KvStore>, options: PortalOptions, timer: Arc<dyn TransferTimer>) -> Self {
        let dashboards = DashboardVariant::ALL
            .into_iter()
            .map(|variant| {
                let registry = FileRegistry::new(store.clone(), DashboardConfig::for_variant(variant));
                (variant, registry)
            })
            .collect();

        Self {
            users: UserRegistry::new(store.clone(), options.credentials, options.hasher, options.limits),
            session: SessionState::new(store.clone()),
            ledger: DownloadLedger::new(store),
            dashboards,
            timer,
            events: EventBus::default(),
        }
    }

    /// Build a portal over the profile named by `config`.
    ///
    /// An empty `database_path` keeps the profile in memory.
    pub fn from_config(config: &Config) -> StoreResult<Self> {
        let store: Arc<dyn KvStore> = if config.database_path.is_empty() {
            tracing::warn!("DATABASE_PATH is empty, profile will not survive a restart");
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(RedbStore::open(&config.database_path)?)
        };

        let options = PortalOptions {
            limits: config.limits,
            hasher: config.password_hasher(),
            credentials: CredentialStore::default(),
        };

        Ok(Self::new(store, options, Arc::new(config.transfer_delays())))
    }

    /// Ephemeral profile with instant transfers
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            PortalOptions::default(),
            Arc::new(Immediate),
        )
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    fn dashboard(&self, variant: DashboardVariant) -> &FileRegistry {
        // Every variant is registered in `new`
        &self.dashboards[&variant]
    }

    /// Session check plus the dashboard itself
    fn open(&self, variant: DashboardVariant) -> Result<(Session, &FileRegistry)> {
        let registry = self.dashboard(variant);
        let session = self.session.require_role(registry.config().allowed_roles)?;
        Ok((session, registry))
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn register(&self, request: &RegistrationRequest) -> Result<User> {
        self.users.register(request).map_err(|e| {
            if let AppError::Registration(reason) = &e {
                self.events.emit(PortalEvent::AuthError {
                    kind: reason.kind().to_string(),
                    message: reason.to_string(),
                });
            }
            e
        })
    }

    pub fn login(&self, identifier: &str, password: &str, remember: bool) -> Result<LoginOutcome> {
        self.session.begin_authentication();
        let authenticated = self.users.authenticate(identifier, password);
        let outcome = authenticated.and_then(|user| self.session.login(&user, remember));
        self.session.end_authentication();

        match outcome {
            Ok(session) => {
                self.events.emit(PortalEvent::AuthSuccess {
                    session: session.clone(),
                });
                let redirect = landing_page(session.role);
                Ok(LoginOutcome { session, redirect })
            }
            Err(e) => {
                if let AppError::Auth(reason) = &e {
                    self.events.emit(PortalEvent::AuthError {
                        kind: reason.kind().to_string(),
                        message: reason.to_string(),
                    });
                }
                Err(e)
            }
        }
    }

    pub fn logout(&self) -> Result<()> {
        self.session.logout()
    }

    pub fn session(&self) -> Result<Option<Session>> {
        self.session.current()
    }

    pub fn auth_phase(&self) -> Result<AuthPhase> {
        self.session.phase()
    }

    // =========================================================================
    // Dashboards
    // =========================================================================

    /// Validate each picked file on its own and start a transfer for every
    /// file that passes. Transfers finish independently of each other.
    ///
    /// Must be called from within a tokio runtime.
    pub fn upload(
        &self,
        variant: DashboardVariant,
        category: &str,
        files: Vec<FileDescriptor>,
    ) -> Result<UploadBatch> {
        let (session, registry) = self.open(variant)?;
        registry.require(Capability::Upload)?;
        registry.rule(category)?;

        let mut report = BatchReport::default();
        let mut transfers = Vec::new();

        for file in files {
            if let Err(e) = registry.validate(&file, category) {
                tracing::warn!("{} rejected {}: {}", session.username, file.name, e);
                self.events.emit(PortalEvent::ValidationError {
                    message: e.to_string(),
                });
                report.rejected.push(Rejection {
                    file: file.name,
                    reason: e.to_string(),
                });
                continue;
            }

            let record = registry.prepare(Upload::File(file), category, Some(&session.username))?;
            self.events.emit(PortalEvent::ValidationOk {
                record: record.clone(),
            });
            report.accepted.push(record.clone());
            transfers.push(self.spawn_transfer(registry, TransferKind::File, record));
        }

        Ok(UploadBatch { report, transfers })
    }

    /// Upload a picked directory. Entries are grouped by their top-level
    /// folder and each group becomes one folder record. Folder contents are
    /// not checked against the category rule.
    ///
    /// Must be called from within a tokio runtime.
    pub fn upload_folder(
        &self,
        variant: DashboardVariant,
        category: &str,
        entries: Vec<FolderEntry>,
    ) -> Result<UploadBatch> {
        let (session, registry) = self.open(variant)?;
        registry.require(Capability::Upload)?;
        registry.rule(category)?;

        let groups = FolderContents::group(entries);
        if let Some((name, _)) = groups
            .iter()
            .find(|(_, files)| FolderContents::checked_total(files).is_none())
        {
            return Err(AppError::InvalidInput(format!("Folder too large: {}", name)));
        }

        let mut report = BatchReport::default();
        let mut transfers = Vec::new();

        for (name, files) in groups {
            let record = registry.prepare(Upload::Folder { name, files }, category, Some(&session.username))?;
            report.accepted.push(record.clone());
            transfers.push(self.spawn_transfer(registry, TransferKind::Folder, record));
        }

        Ok(UploadBatch { report, transfers })
    }

    fn spawn_transfer(
        &self,
        registry: &FileRegistry,
        kind: TransferKind,
        record: FileRecord,
    ) -> JoinHandle<Result<FileRecord>> {
        let registry = registry.clone();
        let timer = self.timer.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            run_transfer(timer.as_ref(), kind, &record.name, &events).await;

            let name = record.name.clone();
            let stored = tokio::task::spawn_blocking(move || registry.commit(record))
                .await?
                .map_err(|e| {
                    tracing::error!("Failed to store {}: {}", name, e);
                    e
                })?;

            events.emit(PortalEvent::UploadComplete {
                record: stored.clone(),
            });
            Ok::<_, AppError>(stored)
        })
    }

    /// Remove a record. Asking the user to confirm is the caller's job.
    pub fn delete(&self, variant: DashboardVariant, category: &str, id: FileId) -> Result<FileRecord> {
        let (_, registry) = self.open(variant)?;
        registry.require(Capability::Delete)?;
        registry.delete(id, category)
    }

    /// Count a download and log it in the history
    pub fn download(&self, variant: DashboardVariant, category: &str, id: FileId) -> Result<FileRecord> {
        let (session, registry) = self.open(variant)?;
        registry.require(Capability::Download)?;

        let record = registry.record_download(id, category)?;
        self.ledger
            .append(DownloadEntry::for_record(&record, Utc::now()))?;

        tracing::info!("{} downloaded {} from {}", session.username, record.name, category);
        self.events.emit(PortalEvent::DownloadComplete {
            record: record.clone(),
        });
        Ok(record)
    }

    pub fn files(&self, variant: DashboardVariant) -> Result<Vec<CategoryListing>> {
        let (_, registry) = self.open(variant)?;
        registry.list_all()
    }

    pub fn recent_downloads(&self) -> Result<Vec<DownloadEntry>> {
        self.session.require_role(&[Role::Viewer])?;
        self.ledger.recent(RECENT_DOWNLOADS_SHOWN)
    }

    pub fn stats(&self, variant: DashboardVariant) -> Result<DashboardStats> {
        let (_, registry) = self.open(variant)?;
        let totals = registry.stats()?;

        Ok(DashboardStats {
            total_files: totals.total_files,
            total_downloads: totals.total_downloads,
            total_users: self.users.count()?,
            my_downloads: self.ledger.len()?,
            total_bytes: totals.total_bytes,
            total_size: format_file_size(totals.total_bytes),
        })
    }

    /// Registered accounts, for admins only
    pub fn users(&self) -> Result<Vec<UserSummary>> {
        self.session.require_role(&[Role::Admin])?;
        Ok(self.users.list()?.iter().map(UserSummary::from).collect())
    }
}

fn landing_page(role: Role) -> &'static str {
    match role {
        Role::Admin => ADMIN_LANDING,
        Role::Viewer => VIEWER_LANDING,
    }
}
