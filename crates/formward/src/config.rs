// File: src/config.rs
// Purpose: Configuration parsing from formward.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::storage::{FileStorage, MemoryStorage, Storage};

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FormwardConfig {
    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub fields: FieldConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

/// Durations for transient UI, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimingConfig {
    /// How long the general form error stays visible
    #[serde(default = "default_general_error_ms")]
    pub general_error_ms: u64,

    /// How long the success overlay stays visible
    #[serde(default = "default_overlay_ms")]
    pub overlay_ms: u64,

    /// Delay between a successful submit and the form reset
    #[serde(default = "default_reset_delay_ms")]
    pub reset_delay_ms: u64,

    /// Default toast lifetime
    #[serde(default = "default_toast_ms")]
    pub toast_ms: u64,
}

/// Where form data is kept
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Identity used for forms without an id
    #[serde(default = "default_form_id")]
    pub default_form_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory, lost on exit
    #[default]
    Memory,

    /// One JSON file per key under `path`
    Filesystem { path: PathBuf },
}

/// Reserved field ids the controller treats specially
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldConfig {
    #[serde(default = "default_password_id")]
    pub password_id: String,

    #[serde(default = "default_confirm_password_id")]
    pub confirm_password_id: String,

    #[serde(default = "default_remember_id")]
    pub remember_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_max_recent")]
    pub max_recent: usize,
}

fn default_general_error_ms() -> u64 {
    5000
}

fn default_overlay_ms() -> u64 {
    3000
}

fn default_reset_delay_ms() -> u64 {
    2000
}

fn default_toast_ms() -> u64 {
    4000
}

fn default_form_id() -> String {
    "form".to_string()
}

fn default_password_id() -> String {
    "password".to_string()
}

fn default_confirm_password_id() -> String {
    "confirm-password".to_string()
}

fn default_remember_id() -> String {
    "remember".to_string()
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_max_recent() -> usize {
    5
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            general_error_ms: default_general_error_ms(),
            overlay_ms: default_overlay_ms(),
            reset_delay_ms: default_reset_delay_ms(),
            toast_ms: default_toast_ms(),
        }
    }
}

impl TimingConfig {
    pub fn general_error(&self) -> Duration {
        Duration::from_millis(self.general_error_ms)
    }

    pub fn overlay(&self) -> Duration {
        Duration::from_millis(self.overlay_ms)
    }

    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }

    pub fn toast(&self) -> Duration {
        Duration::from_millis(self.toast_ms)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            default_form_id: default_form_id(),
        }
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            password_id: default_password_id(),
            confirm_password_id: default_confirm_password_id(),
            remember_id: default_remember_id(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            max_recent: default_max_recent(),
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl FormwardConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Missing or empty file means defaults
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: FormwardConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Load configuration from ./formward.toml
    pub fn load_default() -> Result<Self> {
        Self::load("formward.toml")
    }

    /// Open the configured storage backend
    pub fn open_storage(&self) -> Result<Arc<dyn Storage>> {
        match &self.storage.backend {
            StorageBackend::Memory => Ok(Arc::new(MemoryStorage::new())),
            StorageBackend::Filesystem { path } => {
                let storage = FileStorage::new(path)
                    .with_context(|| format!("Failed to open storage directory: {:?}", path))?;
                Ok(Arc::new(storage))
            }
        }
    }
}
