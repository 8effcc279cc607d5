use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::MIB;
use crate::error::ValidationError;
use crate::models::{FileDescriptor, Role};
use crate::store::tables;

/// One of the three dashboards built over the file registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardVariant {
    Admin,
    Generic,
    Viewer,
}

impl DashboardVariant {
    pub const ALL: [DashboardVariant; 3] = [
        DashboardVariant::Admin,
        DashboardVariant::Generic,
        DashboardVariant::Viewer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DashboardVariant::Admin => "admin",
            DashboardVariant::Generic => "generic",
            DashboardVariant::Viewer => "viewer",
        }
    }
}

impl fmt::Display for DashboardVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DashboardVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(DashboardVariant::Admin),
            "generic" => Ok(DashboardVariant::Generic),
            "viewer" => Ok(DashboardVariant::Viewer),
            other => Err(format!("Unknown dashboard: {}", other)),
        }
    }
}

/// Action a dashboard may or may not offer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Upload,
    Delete,
    Download,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Upload => "upload",
            Capability::Delete => "delete",
            Capability::Download => "download",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub upload: bool,
    pub delete: bool,
    pub download: bool,
}

impl Capabilities {
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Upload => self.upload,
            Capability::Delete => self.delete,
            Capability::Download => self.download,
        }
    }
}

/// Allow-list and size ceiling for one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    pub name: &'static str,
    /// Store key of the partition holding this category's records
    pub storage_key: &'static str,
    /// Lower-case extensions without the leading dot
    pub extensions: &'static [&'static str],
    pub max_bytes: u64,
}

impl CategoryRule {
    /// Extension first, then size. A file exactly at the ceiling passes.
    pub fn check(&self, file: &FileDescriptor) -> Result<(), ValidationError> {
        let extension = file.extension();
        if !self.extensions.contains(&extension.as_str()) {
            return Err(ValidationError::InvalidExtension {
                file: file.name.clone(),
            });
        }

        if file.size > self.max_bytes {
            return Err(ValidationError::TooLarge {
                file: file.name.clone(),
                max_bytes: self.max_bytes,
            });
        }

        Ok(())
    }
}

static ADMIN_CATEGORIES: [CategoryRule; 3] = [
    CategoryRule {
        name: "emulator",
        storage_key: tables::ADMIN_EMULATORS,
        extensions: &["apk", "exe", "msi", "zip", "rar"],
        max_bytes: 1000 * MIB,
    },
    CategoryRule {
        name: "settings",
        storage_key: tables::ADMIN_SETTINGS,
        extensions: &["cfg", "ini", "json", "xml", "conf", "txt"],
        max_bytes: 50 * MIB,
    },
    CategoryRule {
        name: "tools",
        storage_key: tables::ADMIN_TOOLS,
        extensions: &["exe", "bat", "sh", "py", "js", "zip"],
        max_bytes: 200 * MIB,
    },
];

static GENERIC_CATEGORIES: [CategoryRule; 3] = [
    CategoryRule {
        name: "apk",
        storage_key: tables::UPLOADED_APK,
        extensions: &["apk"],
        max_bytes: 500 * MIB,
    },
    CategoryRule {
        name: "exe",
        storage_key: tables::UPLOADED_EXE,
        extensions: &["exe", "msi"],
        max_bytes: 200 * MIB,
    },
    CategoryRule {
        name: "settings",
        storage_key: tables::UPLOADED_SETTINGS,
        extensions: &["cfg", "ini", "json", "xml", "conf", "bat", "sh", "py"],
        max_bytes: 50 * MIB,
    },
];

/// Everything that distinguishes one dashboard from another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub variant: DashboardVariant,
    pub allowed_roles: &'static [Role],
    pub capabilities: Capabilities,
    /// Record the uploader's username on new records
    pub stamps_uploader: bool,
    pub categories: &'static [CategoryRule],
}

impl DashboardConfig {
    pub fn admin() -> Self {
        Self {
            variant: DashboardVariant::Admin,
            allowed_roles: &[Role::Admin],
            capabilities: Capabilities {
                upload: true,
                delete: true,
                download: false,
            },
            stamps_uploader: true,
            categories: &ADMIN_CATEGORIES,
        }
    }

    pub fn generic() -> Self {
        Self {
            variant: DashboardVariant::Generic,
            allowed_roles: &[Role::Admin, Role::Viewer],
            capabilities: Capabilities {
                upload: true,
                delete: true,
                download: true,
            },
            stamps_uploader: false,
            categories: &GENERIC_CATEGORIES,
        }
    }

    /// Read-only view over the admin partitions
    pub fn viewer() -> Self {
        Self {
            variant: DashboardVariant::Viewer,
            allowed_roles: &[Role::Admin, Role::Viewer],
            capabilities: Capabilities {
                upload: false,
                delete: false,
                download: true,
            },
            stamps_uploader: false,
            categories: &ADMIN_CATEGORIES,
        }
    }

    pub fn for_variant(variant: DashboardVariant) -> Self {
        match variant {
            DashboardVariant::Admin => Self::admin(),
            DashboardVariant::Generic => Self::generic(),
            DashboardVariant::Viewer => Self::viewer(),
        }
    }

    pub fn category(&self, name: &str) -> Option<&'static CategoryRule> {
        self.categories.iter().find(|rule| rule.name == name)
    }
}
