//! `build-manifest.json`: the ordered list of buildable entries.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::LedgerError;
use crate::ports::FileSystem;

/// One buildable unit, as produced by the planning step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Specification file the entry implements.
    pub source_file: String,
    /// Build context file; also the lock key.
    pub build_file: String,
    /// Artifact path relative to the output directory, if the entry produces one.
    #[serde(default)]
    pub implementation_path: Option<String>,
    /// Opaque content digest of the entry's inputs.
    pub hash: String,
}

impl ManifestEntry {
    /// File name of the source specification, used for the banner and debug dumps.
    #[must_use]
    pub fn source_name(&self) -> &str {
        Path::new(&self.source_file)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.source_file)
    }

    /// Declared implementation path, ignoring blank values.
    #[must_use]
    pub fn implementation(&self) -> Option<&str> {
        self.implementation_path.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }

    fn check(&self, index: usize) -> Result<(), LedgerError> {
        let required = [
            ("sourceFile", &self.source_file),
            ("buildFile", &self.build_file),
            ("hash", &self.hash),
        ];
        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(LedgerError::MissingField { index, field: *field }),
            None => Ok(()),
        }
    }
}

/// The loaded manifest and the directory its relative paths resolve against.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    /// Entries in build order.
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Read and validate the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, malformed, or an
    /// entry lacks a required field.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self, LedgerError> {
        if !fs.exists(path) {
            return Err(LedgerError::ManifestMissing(path.to_path_buf()));
        }
        let raw = fs
            .read_to_string(path)
            .map_err(|e| LedgerError::Read { path: path.to_path_buf(), message: e.to_string() })?;
        let entries: Vec<ManifestEntry> = serde_json::from_str(&raw)
            .map_err(|e| LedgerError::Parse { path: path.to_path_buf(), message: e.to_string() })?;
        for (index, entry) in entries.iter().enumerate() {
            entry.check(index)?;
        }
        Ok(Self { path: path.to_path_buf(), entries })
    }

    /// Manifest file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the manifest.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Location of `entry`'s build context on disk.
    #[must_use]
    pub fn build_file_path(&self, entry: &ManifestEntry) -> PathBuf {
        let build = Path::new(&entry.build_file);
        if build.is_absolute() {
            build.to_path_buf()
        } else {
            self.dir().join(build)
        }
    }
}
