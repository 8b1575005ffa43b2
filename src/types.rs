use crate::owner;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::Metadata;
use std::path::Path;
use std::time::SystemTime;

/// OS metadata captured once when a `FileRecord` is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMetadata {
    pub file_size_bytes: u64,
    pub created_time: DateTime<Local>,
    pub modified_time: DateTime<Local>,
    pub accessed_time: DateTime<Local>,
    pub owner: String,
}

impl FileMetadata {
    #[must_use]
    pub fn from_metadata(path: &Path, metadata: &Metadata) -> Self {
        // UNIX_EPOCH stands in for timestamps the platform cannot report
        let modified: DateTime<Local> =
            metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH).into();
        let accessed: DateTime<Local> =
            metadata.accessed().unwrap_or(SystemTime::UNIX_EPOCH).into();

        FileMetadata {
            file_size_bytes: metadata.len(),
            created_time: created_time(metadata).into(),
            modified_time: modified,
            accessed_time: accessed,
            owner: owner::resolve_owner(path, metadata),
        }
    }
}

#[cfg(unix)]
fn created_time(metadata: &Metadata) -> SystemTime {
    use std::os::unix::fs::MetadataExt;
    use std::time::Duration;

    metadata.created().unwrap_or_else(|_| {
        // No birth time on this filesystem, use the inode change time
        u64::try_from(metadata.ctime())
            .map(|secs| SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap_or(SystemTime::UNIX_EPOCH)
    })
}

#[cfg(not(unix))]
fn created_time(metadata: &Metadata) -> SystemTime {
    metadata.created().unwrap_or(SystemTime::UNIX_EPOCH)
}
