//! Structured views of files and directory trees: OS metadata, lazily
//! computed content hashes, dates inferred from file names, and a
//! row-per-file tabular export.

pub mod date;
pub mod error;
pub mod export;
pub mod file;
pub mod folder;
pub mod owner;
pub mod types;

pub use error::{FileFolderError, Result};
pub use export::Table;
pub use file::FileRecord;
pub use folder::{FolderRecord, ScanMode};
pub use types::FileMetadata;
