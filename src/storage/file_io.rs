//! JSON document persistence
//!
//! Each ledger file is one JSON document. A missing document reads as empty;
//! writes go through a sibling temp file and a rename, so a document on disk
//! is always either the old or the new version.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::LedgerError;

fn storage_error(action: &str, path: &Path, err: impl std::fmt::Display) -> LedgerError {
    LedgerError::Storage(format!("Failed to {} {}: {}", action, path.display(), err))
}

/// Temp file next to `path` (`.accounts.json.tmp`), so the rename stays on
/// one filesystem
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

/// Read a ledger document, or its default when the file does not exist yet
pub fn read_json<T, P>(path: P) -> Result<T, LedgerError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(storage_error("read", path, e)),
    };

    serde_json::from_slice(&bytes).map_err(|e| storage_error("parse", path, e))
}

/// Replace a ledger document atomically
///
/// The document is serialized before anything touches the disk. On any
/// failure the temp file is removed and the previous document is left as it
/// was.
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), LedgerError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let bytes = serde_json::to_vec_pretty(data).map_err(|e| storage_error("serialize", path, e))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| storage_error("create directory for", path, e))?;
    }

    let temp = temp_path(path);
    let result = File::create(&temp)
        .and_then(|mut file| {
            file.write_all(&bytes)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&temp, path));

    result.map_err(|e| {
        let _ = fs::remove_file(&temp);
        storage_error("write", path, e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct Ledger {
        rows: Vec<String>,
    }

    fn ledger(rows: &[&str]) -> Ledger {
        Ledger {
            rows: rows.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_missing_document_reads_as_default() {
        let temp_dir = TempDir::new().unwrap();
        let data: Ledger = read_json(temp_dir.path().join("transfers.json")).unwrap();
        assert_eq!(data, Ledger::default());
    }

    #[test]
    fn test_write_replaces_document_without_leftovers() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("transactions.json");

        write_json_atomic(&path, &ledger(&["a"])).unwrap();
        write_json_atomic(&path, &ledger(&["a", "b"])).unwrap();

        let loaded: Ledger = read_json(&path).unwrap();
        assert_eq!(loaded, ledger(&["a", "b"]));
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_corrupt_document_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("references.json");
        fs::write(&path, "{ not json").unwrap();

        let err = read_json::<Ledger, _>(&path).unwrap_err();
        assert!(matches!(err, LedgerError::Storage(_)));
        assert!(err.to_string().contains("references.json"));
    }

    #[test]
    fn test_failed_write_cleans_up_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("accounts.json");
        // A directory in place of the document makes the rename fail
        fs::create_dir(&path).unwrap();

        let err = write_json_atomic(&path, &ledger(&["a"])).unwrap_err();
        assert!(err.to_string().contains("accounts.json"));
        assert!(path.is_dir());
        assert!(!temp_path(&path).exists());
    }
}
