//! Key-value storage backends
//!
//! Mirrors the browser's local storage: synchronous, string keys, string
//! values. Typed JSON access goes through [`StorageExt`]. Every operation
//! can fail (quota, disabled storage, corrupt data) and callers are
//! expected to recover.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub mod filesystem;
pub mod memory;

pub use filesystem::FileStorage;
pub use memory::MemoryStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is unavailable: {0}")]
    Unavailable(String),

    #[error("quota exceeded while writing `{key}`")]
    QuotaExceeded { key: String },

    #[error("could not (de)serialize `{key}`: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("i/o error on `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Trait for string-keyed storage backends
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

/// JSON helpers available on every backend
pub trait StorageExt: Storage {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.get_item(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StorageError::Serialization {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialization {
            key: key.to_string(),
            source,
        })?;
        self.set_item(key, &raw)
    }
}

impl<S: Storage + ?Sized> StorageExt for S {}

/// Key of the single-record (autofill) slot for a form
pub fn record_key(form_id: &str) -> String {
    format!("formData_{}", form_id)
}

/// Key of the submission history for a form
pub fn history_key(form_id: &str) -> String {
    format!("formSubmissions_{}", form_id)
}
