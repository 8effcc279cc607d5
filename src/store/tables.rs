use redb::TableDefinition;

/// Profile table: storage key -> JSON value
/// Mirrors a browser profile's flat local storage namespace
pub const PROFILE: TableDefinition<&str, &[u8]> = TableDefinition::new("profile");

/// Registered users: JSON array of User
pub const REGISTERED_USERS: &str = "registeredUsers";

/// Session projection of the logged-in user: JSON object
pub const CURRENT_USER: &str = "currentUser";

/// Login flag, the literal string "true" while a session is active
pub const IS_LOGGED_IN: &str = "isLoggedIn";

/// Set to "true" when the login asked to be remembered
pub const REMEMBER_USER: &str = "rememberUser";

/// Download history: JSON array of DownloadEntry, most recent first
pub const DOWNLOAD_HISTORY: &str = "downloadHistory";

/// Admin dashboard partitions (also read by the viewer dashboard)
pub const ADMIN_EMULATORS: &str = "adminEmulators";
pub const ADMIN_SETTINGS: &str = "adminSettings";
pub const ADMIN_TOOLS: &str = "adminTools";

/// Generic dashboard partitions
pub const UPLOADED_APK: &str = "uploadedApk";
pub const UPLOADED_EXE: &str = "uploadedExe";
pub const UPLOADED_SETTINGS: &str = "uploadedSettings";
