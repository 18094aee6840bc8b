//! Per-file settings store
//!
//! A process-wide mutable map of per-file overrides, keyed by file
//! identity. Entries are created lazily on first write. When a buffer
//! closes, its entry is dropped only if the buffer was never persisted
//! to disk; settings for saved files persist for the editor session.

use crate::host::Document;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// Settings key used when no file is active.
pub const DEFAULT_KEY: &str = "(default)";

/// Per-file overrides. Every field is optional; absence means "inherit
/// from the static configuration". Wire names follow the Wandbox
/// request schema so the record round-trips through the raw-JSON
/// settings editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,

    /// Companion file names, in user-specified order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additionals: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,

    #[serde(rename = "compiler-option-raw", skip_serializing_if = "Option::is_none")]
    pub compiler_option_raw: Option<String>,

    #[serde(rename = "runtime-option-raw", skip_serializing_if = "Option::is_none")]
    pub runtime_option_raw: Option<String>,
}

/// Process-wide settings map. All mutations go through the inner mutex,
/// which serializes access when the host runtime uses real threads.
#[derive(Default)]
pub struct SettingsStore {
    entries: Mutex<HashMap<String, FileSettings>>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The settings key for the given active document, or the synthetic
    /// default key when no document is active.
    pub fn key_for(document: Option<&Document>) -> String {
        document
            .map(|d| d.id.clone())
            .unwrap_or_else(|| DEFAULT_KEY.to_string())
    }

    pub async fn get(&self, key: &str) -> Option<FileSettings> {
        self.entries.lock().await.get(key).cloned()
    }

    /// Mutate the entry for `key`, creating it on first write.
    pub async fn update<F>(&self, key: &str, mutate: F)
    where
        F: FnOnce(&mut FileSettings),
    {
        let mut entries = self.entries.lock().await;
        mutate(entries.entry(key.to_string()).or_default());
    }

    /// Replace the whole entry, as the raw-JSON settings editor does.
    pub async fn replace(&self, key: &str, settings: FileSettings) {
        self.entries.lock().await.insert(key.to_string(), settings);
    }

    /// Remove the entry. Returns whether one existed.
    pub async fn reset(&self, key: &str) -> bool {
        self.entries.lock().await.remove(key).is_some()
    }

    /// Append a companion file name to `target`'s list, creating the
    /// list (and the entry) if absent.
    pub async fn push_companion(&self, target: &str, file_name: &str) {
        let mut entries = self.entries.lock().await;
        let settings = entries.entry(target.to_string()).or_default();
        settings
            .additionals
            .get_or_insert_with(Vec::new)
            .push(file_name.to_string());
    }

    /// Buffer-close handler: transient (untitled) buffers take their
    /// settings with them, saved files keep theirs for the session.
    pub async fn document_closed(&self, document: &Document) {
        if document.untitled && self.entries.lock().await.remove(&document.id).is_some() {
            debug!("dropped settings for closed untitled buffer {}", document.id);
        }
    }
}
