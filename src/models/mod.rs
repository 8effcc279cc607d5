pub mod download;
pub mod file;
pub mod user;

pub use download::DownloadEntry;
pub use file::{
    format_file_size, FileDescriptor, FileId, FileRecord, FolderContents, FolderEntry, Upload,
};
pub use user::{Role, Session, User, UserSummary};
