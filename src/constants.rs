/// Registration keys that grant the admin role
pub const ADMIN_KEYS: [&str; 2] = ["ADMIN-MASTER-2024", "GAMEFORGE-ADMIN-001"];

/// Registration keys that grant the viewer role
pub const VIEWER_KEYS: [&str; 10] = [
    "GAMEFORGE-PREMIUM-2024",
    "ELITE-GAMER-ACCESS-001",
    "PRO-DEVELOPER-KEY-999",
    "MASTER-BUILDER-2024",
    "ULTIMATE-ACCESS-VIP",
    "GAMING-LEGEND-2024",
    "PREMIUM-ACCESS-777",
    "VIP-MEMBER-2024",
    "EXCLUSIVE-KEY-888",
    "DEVELOPER-SPECIAL-999",
];

/// Maximum number of admin accounts per profile
pub const DEFAULT_MAX_ADMINS: usize = 1;

/// Maximum number of viewer accounts per profile (effectively unbounded)
pub const DEFAULT_MAX_VIEWERS: usize = 1_000_000;

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// One mebibyte, the unit all category size ceilings are expressed in
pub const MIB: u64 = 1024 * 1024;

/// Number of entries kept in the download history
pub const LEDGER_CAPACITY: usize = 50;

/// Number of ledger entries shown as "recent downloads"
pub const RECENT_DOWNLOADS_SHOWN: usize = 5;

/// Media type recorded for folder uploads
pub const FOLDER_MEDIA_TYPE: &str = "folder";

// =============================================================================
// Simulated Transfers
// =============================================================================

/// Single file uploads complete after 2-5 seconds
pub const UPLOAD_DELAY_MIN_MS: u64 = 2_000;
pub const UPLOAD_DELAY_MAX_MS: u64 = 5_000;

/// Folder uploads complete after 3-5 seconds
pub const FOLDER_DELAY_MIN_MS: u64 = 3_000;
pub const FOLDER_DELAY_MAX_MS: u64 = 5_000;

/// Progress events emitted per transfer (the final one is always 100%)
pub const PROGRESS_STEPS: u32 = 10;

/// Buffered events per subscriber before slow receivers start lagging
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

// =============================================================================
// Navigation
// =============================================================================

/// Entry point unauthenticated or unauthorized callers are sent to
pub const LOGIN_REDIRECT: &str = "login.html";

/// Landing page after an admin logs in
pub const ADMIN_LANDING: &str = "admin-dashboard.html";

/// Landing page after a viewer logs in
pub const VIEWER_LANDING: &str = "viewer-dashboard.html";
