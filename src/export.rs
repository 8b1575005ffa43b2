//! Row-per-file flattening of a `FolderRecord`.
//!
//! Each row carries the file's fields under `file.` and the folder's fields
//! under `folder.`. Nested objects such as the metadata become dotted column
//! names (`file.metadata.file_size_bytes`); lists stay single values, so
//! `folder.folders` holds the subfolder names on every row.

use crate::error::Result;
use crate::file::FileRecord;
use crate::folder::FolderRecord;
use crate::types::FileMetadata;
use chrono::NaiveDate;
use comfy_table::Cell;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Serialize)]
struct FileRow<'a> {
    file_path: String,
    file_name: &'a str,
    file_extension: &'a str,
    metadata: &'a FileMetadata,
    hash: Option<&'a str>,
    datestamp: Option<NaiveDate>,
}

#[derive(Serialize)]
struct FolderRow<'a> {
    folder_path: String,
    folder_name: &'a str,
    folders: Vec<&'a str>,
}

#[derive(Serialize)]
struct ExportRow<'a> {
    file: FileRow<'a>,
    folder: &'a FolderRow<'a>,
}

/// Rows of JSON values under dotted column names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Every value in the named column, top to bottom.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    #[must_use]
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Render as a JSON array with one object per row.
    ///
    /// # Errors
    /// Returns `Json` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        let records: Vec<Map<String, Value>> = self
            .rows
            .iter()
            .map(|row| self.columns.iter().cloned().zip(row.iter().cloned()).collect())
            .collect();
        Ok(serde_json::to_string_pretty(&records)?)
    }

    /// Render for a terminal.
    #[must_use]
    pub fn to_comfy_table(&self) -> comfy_table::Table {
        let mut table = comfy_table::Table::new();
        table.load_preset(comfy_table::presets::UTF8_HORIZONTAL_ONLY);
        table.set_header(self.columns.iter().map(|c| c.as_str()).collect::<Vec<_>>());

        for row in &self.rows {
            table.add_row(row.iter().map(|v| Cell::new(display_value(v))).collect::<Vec<_>>());
        }
        table
    }

    fn push_row(&mut self, row: Map<String, Value>) {
        for key in row.keys() {
            if self.column_index(key).is_none() {
                self.columns.push(key.clone());
                for existing in &mut self.rows {
                    existing.push(Value::Null);
                }
            }
        }
        let values = self
            .columns
            .iter()
            .map(|c| row.get(c).cloned().unwrap_or(Value::Null))
            .collect();
        self.rows.push(values);
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn flatten_into(prefix: &str, value: Value, out: &mut Map<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                let key = if prefix.is_empty() {
                    key
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(&key, nested, out);
            }
        }
        leaf => {
            out.insert(prefix.to_string(), leaf);
        }
    }
}

fn file_row(file: &FileRecord, include_calculated_fields: bool) -> Result<FileRow<'_>> {
    let (hash, datestamp) = if include_calculated_fields {
        (Some(file.hash()?), Some(file.inferred_date()))
    } else {
        (None, None)
    };

    Ok(FileRow {
        file_path: file.path().to_string_lossy().to_string(),
        file_name: file.name(),
        file_extension: file.extension(),
        metadata: file.metadata(),
        hash,
        datestamp,
    })
}

pub(crate) fn folder_to_table(folder: &FolderRecord, include_calculated_fields: bool) -> Result<Table> {
    let folder_row = FolderRow {
        folder_path: folder.path().to_string_lossy().to_string(),
        folder_name: folder.name(),
        folders: folder.subfolders().iter().map(FolderRecord::name).collect(),
    };

    let mut table = Table::default();
    for file in folder.files() {
        let row = ExportRow {
            file: file_row(file, include_calculated_fields)?,
            folder: &folder_row,
        };
        let mut flat = Map::new();
        flatten_into("", serde_json::to_value(&row)?, &mut flat);
        table.push_row(flat);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::folder::ScanMode;
    use std::fs;

    const EXPECTED_COLUMNS: [&str; 13] = [
        "file.file_path",
        "file.file_name",
        "file.file_extension",
        "file.metadata.file_size_bytes",
        "file.metadata.created_time",
        "file.metadata.modified_time",
        "file.metadata.accessed_time",
        "file.metadata.owner",
        "file.hash",
        "file.datestamp",
        "folder.folder_path",
        "folder.folder_name",
        "folder.folders",
    ];

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_empty_folder_exports_empty_table() {
        init_logging();
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("only_a_subfolder")).unwrap();

        let table = FolderRecord::scan(tmp.path(), ScanMode::Shallow)
            .to_table(true)
            .unwrap();
        assert!(table.is_empty());
        assert!(table.columns().is_empty());
        assert_eq!(table, Table::default());
    }

    #[test]
    fn test_single_file_without_calculated_fields() {
        init_logging();
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("invoice_2023.05.10.pdf"), b"hello world").unwrap();

        let folder = FolderRecord::scan(tmp.path(), ScanMode::Shallow);
        let table = folder.to_table(false).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.columns(), EXPECTED_COLUMNS.map(String::from));
        assert_eq!(table.get(0, "file.hash"), Some(&Value::Null));
        assert_eq!(table.get(0, "file.datestamp"), Some(&Value::Null));
        assert_eq!(
            table.get(0, "file.file_name"),
            Some(&Value::from("invoice_2023.05.10"))
        );
        assert_eq!(table.get(0, "file.file_extension"), Some(&Value::from("pdf")));
        assert_eq!(
            table.get(0, "file.metadata.file_size_bytes"),
            Some(&Value::from(11u64))
        );
        assert_eq!(
            table.get(0, "folder.folder_name"),
            Some(&Value::from(folder.name()))
        );
    }

    #[test]
    fn test_calculated_fields_are_filled_on_request() {
        init_logging();
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("invoice_2023.05.10.pdf"), b"hello world").unwrap();

        let table = FolderRecord::scan(tmp.path(), ScanMode::Shallow)
            .to_table(true)
            .unwrap();

        assert_eq!(
            table.get(0, "file.hash"),
            Some(&Value::from(
                "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
            ))
        );
        assert_eq!(table.get(0, "file.datestamp"), Some(&Value::from("2023-05-10")));
    }

    #[test]
    fn test_folder_fields_repeat_on_every_row() {
        init_logging();
        let tmp = tempfile::tempdir().unwrap();
        for name in ["a.txt", "b.txt", "c.txt"] {
            fs::write(tmp.path().join(name), name).unwrap();
        }
        fs::create_dir(tmp.path().join("sub_one")).unwrap();
        fs::create_dir(tmp.path().join("sub_two")).unwrap();

        let table = FolderRecord::scan(tmp.path(), ScanMode::Shallow)
            .to_table(false)
            .unwrap();

        assert_eq!(table.len(), 3);
        let expected = serde_json::json!(["sub_one", "sub_two"]);
        for value in table.column("folder.folders").unwrap() {
            assert_eq!(value, &expected);
        }
        let names: Vec<_> = table
            .column("file.file_name")
            .unwrap()
            .into_iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(table.column("folder.files").is_none());
    }

    #[test]
    fn test_hash_failure_propagates() {
        init_logging();
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("vanishing.txt");
        fs::write(&path, b"x").unwrap();

        let folder = FolderRecord::scan(tmp.path(), ScanMode::Shallow);
        fs::remove_file(&path).unwrap();

        assert!(folder.to_table(false).is_ok());
        assert!(folder.to_table(true).is_err());
    }

    #[test]
    fn test_json_and_terminal_rendering() {
        init_logging();
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("notes.txt"), b"abc").unwrap();

        let table = FolderRecord::scan(tmp.path(), ScanMode::Shallow)
            .to_table(false)
            .unwrap();

        let parsed: Value = serde_json::from_str(&table.to_json().unwrap()).unwrap();
        let records = parsed.as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["file.file_name"], Value::from("notes"));
        assert_eq!(records[0]["file.hash"], Value::Null);

        let rendered = table.to_comfy_table().to_string();
        assert!(rendered.contains("file.file_name"));
        assert!(rendered.contains("notes"));
    }

    #[test]
    fn test_flatten_nested_objects() {
        let mut out = Map::new();
        flatten_into(
            "",
            serde_json::json!({"a": {"b": {"c": 1}, "d": [1, 2]}, "e": null}),
            &mut out,
        );
        let keys: Vec<_> = out.keys().cloned().collect();
        assert_eq!(keys, vec!["a.b.c", "a.d", "e"]);
        assert_eq!(out["a.d"], serde_json::json!([1, 2]));
    }
}
