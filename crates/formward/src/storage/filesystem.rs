//! Filesystem storage backend
//!
//! One file per key under a directory. Survives restarts, single process.

use crate::storage::{Storage, StorageError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for a key. Percent-encoding keeps distinct keys on
    /// distinct files.
    fn key_to_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", urlencoding::encode(key)))
    }

    fn io_error(key: &str, source: std::io::Error) -> StorageError {
        StorageError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.key_to_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.key_to_path(key);
        let tmp = path.with_extension("json.tmp");

        // Write then rename so readers never see a half-written value
        fs::write(&tmp, value).map_err(|e| Self::io_error(key, e))?;
        fs::rename(&tmp, &path).map_err(|e| Self::io_error(key, e))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.key_to_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    fn name(&self) -> &'static str {
        "filesystem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("store")).unwrap();

        assert!(storage.get_item("formData_booking").unwrap().is_none());
        storage.set_item("formData_booking", r#"{"name":"Ada"}"#).unwrap();
        assert_eq!(
            storage.get_item("formData_booking").unwrap().as_deref(),
            Some(r#"{"name":"Ada"}"#)
        );

        // A second instance over the same directory sees the data
        let reopened = FileStorage::new(dir.path().join("store")).unwrap();
        assert!(reopened.get_item("formData_booking").unwrap().is_some());

        reopened.remove_item("formData_booking").unwrap();
        assert!(storage.get_item("formData_booking").unwrap().is_none());
        reopened.remove_item("formData_booking").unwrap();
    }

    #[test]
    fn test_unsafe_keys_are_encoded() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        storage.set_item("a/b:c", "x").unwrap();
        assert!(dir.path().join("a%2Fb%3Ac.json").exists());
        assert_eq!(storage.get_item("a/b:c").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn test_keys_differing_in_reserved_char_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        storage.set_item("formData_a/b", "1").unwrap();
        storage.set_item("formData_a_b", "2").unwrap();
        assert_eq!(storage.get_item("formData_a/b").unwrap().as_deref(), Some("1"));
        assert_eq!(storage.get_item("formData_a_b").unwrap().as_deref(), Some("2"));

        storage.remove_item("formData_a_b").unwrap();
        assert_eq!(storage.get_item("formData_a/b").unwrap().as_deref(), Some("1"));
    }
}
