use crate::date;
use crate::error::{FileFolderError, Result};
use crate::types::FileMetadata;
use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use std::cell::OnceCell;
use std::fs::{self, FileTimes};
use std::io;
use std::path::{Path, PathBuf};

/// One file on disk with its metadata, plus a hash and an inferred date
/// that are only computed when first asked for.
#[derive(Debug, Clone)]
pub struct FileRecord {
    path: PathBuf,
    name: String,
    extension: String,
    metadata: FileMetadata,
    hash: OnceCell<String>,
    inferred_date: OnceCell<NaiveDate>,
}

impl FileRecord {
    /// Stat `path` and build a record for it.
    ///
    /// # Errors
    /// `NotFound` when `path` is not an existing regular file.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let metadata = match fs::metadata(&path) {
            Ok(m) if m.is_file() => m,
            _ => return Err(FileFolderError::NotFound { path }),
        };

        let metadata = FileMetadata::from_metadata(&path, &metadata);
        let (name, extension) = split_name(&path);

        Ok(FileRecord {
            path,
            name,
            extension,
            metadata,
            hash: OnceCell::new(),
            inferred_date: OnceCell::new(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without its extension.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extension without the leading dot, empty when there is none.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    #[must_use]
    pub fn metadata(&self) -> &FileMetadata {
        &self.metadata
    }

    /// SHA-256 of the file contents as lowercase hex.
    ///
    /// Computed on first call and cached; later changes on disk are not seen.
    ///
    /// # Errors
    /// Propagates the read error if the file has gone away.
    pub fn hash(&self) -> Result<&str> {
        if let Some(hash) = self.hash.get() {
            return Ok(hash.as_str());
        }
        let computed = hash_file_sha256(&self.path)?;
        Ok(self.hash.get_or_init(|| computed).as_str())
    }

    /// Date inferred from the file name, `2000-01-01` when none is found.
    pub fn inferred_date(&self) -> NaiveDate {
        *self.inferred_date.get_or_init(|| {
            let file_name = self
                .path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            date::infer_date(&file_name)
        })
    }

    /// Move the file to `target` and point the record at its new location.
    ///
    /// # Errors
    /// `NotFound` when the file no longer exists, `Io` when the move fails.
    pub fn move_to(&mut self, target: impl AsRef<Path>) -> Result<()> {
        self.ensure_exists()?;
        let target = self.resolve_target(target.as_ref());

        match fs::rename(&self.path, &target) {
            Ok(()) => {}
            // rename cannot cross filesystems, fall back to copy + remove
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                log::debug!(
                    "{} and {} are on different filesystems, copying instead",
                    self.path.display(),
                    target.display()
                );
                copy_with_times(&self.path, &target)?;
                if let Err(e) = fs::remove_file(&self.path) {
                    // Keep a single copy so the record still matches the disk
                    let _ = fs::remove_file(&target);
                    return Err(FileFolderError::io(&self.path, e));
                }
            }
            Err(e) => return Err(FileFolderError::io(&self.path, e)),
        }

        let (name, extension) = split_name(&target);
        self.path = target;
        self.name = name;
        self.extension = extension;
        Ok(())
    }

    /// Copy the file to `target`, keeping permissions and timestamps.
    /// The record keeps pointing at the original.
    ///
    /// # Errors
    /// `NotFound` when the file no longer exists, `Io` when the copy fails.
    pub fn copy_to(&self, target: impl AsRef<Path>) -> Result<PathBuf> {
        self.ensure_exists()?;
        let target = self.resolve_target(target.as_ref());
        copy_with_times(&self.path, &target)?;
        Ok(target)
    }

    fn ensure_exists(&self) -> Result<()> {
        if self.path.exists() {
            Ok(())
        } else {
            Err(FileFolderError::NotFound {
                path: self.path.clone(),
            })
        }
    }

    fn resolve_target(&self, target: &Path) -> PathBuf {
        match self.path.file_name() {
            Some(file_name) if target.is_dir() => target.join(file_name),
            _ => target.to_path_buf(),
        }
    }
}

fn split_name(path: &Path) -> (String, String) {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();
    (name, extension)
}

/// Hash a file's full contents with SHA-256.
///
/// # Errors
/// Returns `Io` if the file cannot be read.
pub fn hash_file_sha256(path: &Path) -> Result<String> {
    let contents = fs::read(path).map_err(|e| FileFolderError::io(path, e))?;
    let mut hasher = Sha256::new();
    hasher.update(&contents);
    Ok(format!("{:x}", hasher.finalize()))
}

fn copy_with_times(source: &Path, target: &Path) -> Result<()> {
    // fs::copy carries permissions over, timestamps are set separately
    fs::copy(source, target).map_err(|e| FileFolderError::io(target, e))?;

    let metadata = fs::metadata(source).map_err(|e| FileFolderError::io(source, e))?;
    let mut times = FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }

    // A read-only copy cannot be opened for writing, so lift the flag while
    // stamping the times and restore the source permissions afterwards
    let permissions = metadata.permissions();
    if permissions.readonly() {
        let mut writable = permissions.clone();
        #[allow(clippy::permissions_set_readonly_false)]
        writable.set_readonly(false);
        fs::set_permissions(target, writable).map_err(|e| FileFolderError::io(target, e))?;
    }

    let stamped = fs::OpenOptions::new()
        .write(true)
        .open(target)
        .and_then(|copied| copied.set_times(times));
    let restored = fs::set_permissions(target, permissions);

    stamped.map_err(|e| FileFolderError::io(target, e))?;
    restored.map_err(|e| FileFolderError::io(target, e))
}
