use crate::error::Result;
use crate::export::{self, Table};
use crate::file::FileRecord;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// How far a folder scan descends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Immediate files only. Each immediate subfolder is scanned the same
    /// way, so the whole tree is built one level at a time.
    #[default]
    Shallow,
    /// Every file anywhere below the folder, flattened into `files`.
    /// Subfolders are listed but not scanned.
    Recursive,
}

/// A point-in-time listing of one directory.
#[derive(Debug, Clone)]
pub struct FolderRecord {
    path: PathBuf,
    name: String,
    subfolders: Vec<FolderRecord>,
    files: Vec<FileRecord>,
}

impl FolderRecord {
    /// A record for `path` with empty listings; nothing is read from disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        FolderRecord {
            path,
            name,
            subfolders: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Build a record for `path` and scan it.
    ///
    /// Never fails: an unreadable or missing directory gives empty listings.
    pub fn scan(path: impl Into<PathBuf>, mode: ScanMode) -> Self {
        let mut folder = FolderRecord::new(path);
        folder.rescan(mode);
        folder
    }

    /// Replace the listings with a fresh scan.
    pub fn rescan(&mut self, mode: ScanMode) {
        let max_depth = match mode {
            ScanMode::Shallow => Some(1),
            ScanMode::Recursive => None,
        };

        let mut subfolders = Vec::new();
        let mut files = Vec::new();
        for entry in walk(&self.path, max_depth) {
            let file_type = entry.file_type();
            if file_type.is_dir() && entry.depth() == 1 {
                subfolders.push(match mode {
                    ScanMode::Shallow => FolderRecord::scan(entry.into_path(), ScanMode::Shallow),
                    ScanMode::Recursive => FolderRecord::new(entry.into_path()),
                });
            } else if file_type.is_file() {
                match FileRecord::new(entry.path()) {
                    Ok(record) => files.push(record),
                    // Listed a moment ago, gone or unreadable now
                    Err(err) => log::warn!("skipping {}: {err}", entry.path().display()),
                }
            }
        }
        self.subfolders = subfolders;
        self.files = files;

        log::debug!(
            "scanned {} ({:?}): {} files, {} subfolders",
            self.path.display(),
            mode,
            self.files.len(),
            self.subfolders.len()
        );
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn subfolders(&self) -> &[FolderRecord] {
        &self.subfolders
    }

    #[must_use]
    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    /// Sum of `file_size_bytes` over `files`.
    #[must_use]
    pub fn total_size_bytes(&self) -> u64 {
        self.files
            .iter()
            .map(|f| f.metadata().file_size_bytes)
            .sum()
    }

    /// Flatten this folder into one row per file.
    ///
    /// `file.hash` and `file.datestamp` stay null unless
    /// `include_calculated_fields` is set, since both read or parse every file.
    ///
    /// # Errors
    /// Propagates hashing failures when calculated fields are requested.
    pub fn to_table(&self, include_calculated_fields: bool) -> Result<Table> {
        export::folder_to_table(self, include_calculated_fields)
    }
}

/// Entries below `root` in file-name order, never following symlinks.
/// Unreadable directories are logged and skipped.
fn walk(root: &Path, max_depth: Option<usize>) -> impl Iterator<Item = DirEntry> {
    let mut walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth);
    }

    walker.into_iter().filter_map(|entry| match entry {
        Ok(e) => Some(e),
        Err(err) => {
            log::debug!("skipping unreadable entry: {err}");
            None
        }
    })
}
