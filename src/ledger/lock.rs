//! `gen-lock.json`: build file → last-applied hash.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::LedgerError;
use crate::ports::FileSystem;

/// The incremental-build lock. Keys are manifest `buildFile` values verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenLock(BTreeMap<String, String>);

impl GenLock {
    /// Load the lock, or an empty one if `path` does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self, LedgerError> {
        if !fs.exists(path) {
            tracing::debug!(lock = %path.display(), "no lock yet, starting from scratch");
            return Ok(Self::default());
        }
        let raw = fs
            .read_to_string(path)
            .map_err(|e| LedgerError::Read { path: path.to_path_buf(), message: e.to_string() })?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&raw)
            .map_err(|e| LedgerError::Parse { path: path.to_path_buf(), message: e.to_string() })
    }

    /// Write the whole lock as pretty JSON with sorted keys.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, fs: &dyn FileSystem, path: &Path) -> Result<(), LedgerError> {
        let write_err =
            |message: String| LedgerError::Write { path: path.to_path_buf(), message };
        let mut text = serde_json::to_string_pretty(self).map_err(|e| write_err(e.to_string()))?;
        text.push('\n');
        fs.write(path, &text).map_err(|e| write_err(e.to_string()))
    }

    /// Hash recorded for `build_file`.
    #[must_use]
    pub fn get(&self, build_file: &str) -> Option<&str> {
        self.0.get(build_file).map(String::as_str)
    }

    /// Record `hash` for `build_file`.
    pub fn insert(&mut self, build_file: &str, hash: &str) {
        self.0.insert(build_file.to_string(), hash.to_string());
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
