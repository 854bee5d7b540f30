//! Build ledger: the manifest of buildable entries and the lock of
//! last-applied hashes.
//!
//! The manifest is read-only input. The lock is loaded once, mutated in
//! memory as entries commit, and flushed once when the run ends, so an
//! interrupted run never records work that did not finish.

pub mod lock;
pub mod manifest;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::ports::FileSystem;

pub use lock::GenLock;
pub use manifest::{Manifest, ManifestEntry};

/// File name of the lock, stored next to the manifest.
pub const LOCK_FILE_NAME: &str = "gen-lock.json";

/// Errors raised while loading or persisting the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The manifest file does not exist.
    #[error("manifest not found: {0}")]
    ManifestMissing(PathBuf),
    /// A durable file could not be read.
    #[error("failed to read {path}: {message}")]
    Read {
        /// File being read.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },
    /// A durable file is not valid JSON of the expected shape.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },
    /// A manifest entry lacks a required identifying field.
    #[error("manifest entry #{index} is missing required field '{field}'")]
    MissingField {
        /// Zero-based position of the entry in the manifest.
        index: usize,
        /// Field name as it appears in the manifest.
        field: &'static str,
    },
    /// The lock could not be written.
    #[error("failed to write lock {path}: {message}")]
    Write {
        /// Lock file path.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },
}

/// Change-detection view over the lock for one run.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    lock: GenLock,
}

impl Ledger {
    /// Load the lock at `path`, treating a missing file as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing lock cannot be read or parsed.
    pub fn open(fs: &dyn FileSystem, path: &Path) -> Result<Self, LedgerError> {
        Ok(Self { path: path.to_path_buf(), lock: GenLock::load(fs, path)? })
    }

    /// Hash last committed for `entry`, if any.
    #[must_use]
    pub fn last_hash(&self, entry: &ManifestEntry) -> Option<&str> {
        self.lock.get(&entry.build_file)
    }

    /// True iff the committed hash matches and the artifact at `target` exists.
    #[must_use]
    pub fn is_unchanged(&self, fs: &dyn FileSystem, entry: &ManifestEntry, target: &Path) -> bool {
        self.last_hash(entry) == Some(entry.hash.as_str()) && fs.exists(target)
    }

    /// Record `entry` as applied, in memory only.
    pub fn commit(&mut self, entry: &ManifestEntry) {
        self.lock.insert(&entry.build_file, &entry.hash);
    }

    /// Persist the lock. Consumes the ledger, so it happens once per run.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be written.
    pub fn flush(self, fs: &dyn FileSystem) -> Result<GenLock, LedgerError> {
        self.lock.save(fs, &self.path)?;
        Ok(self.lock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemFs;

    fn entry(build: &str, hash: &str) -> ManifestEntry {
        ManifestEntry {
            source_file: "a.isl.md".into(),
            build_file: build.into(),
            implementation_path: Some("./a".into()),
            hash: hash.into(),
        }
    }

    #[test]
    fn missing_lock_means_everything_changed() {
        let fs = MemFs::with(&[("/out/a.jsx", "x")]);
        let ledger = Ledger::open(&fs, Path::new("/p/gen-lock.json")).unwrap();
        assert!(!ledger.is_unchanged(&fs, &entry("a.build.md", "h1"), Path::new("/out/a.jsx")));
    }

    #[test]
    fn unchanged_requires_hash_and_artifact() {
        let fs = MemFs::with(&[("/p/gen-lock.json", r#"{"a.build.md":"h1"}"#), ("/out/a.jsx", "x")]);
        let ledger = Ledger::open(&fs, Path::new("/p/gen-lock.json")).unwrap();
        let target = Path::new("/out/a.jsx");

        assert!(ledger.is_unchanged(&fs, &entry("a.build.md", "h1"), target));
        assert!(!ledger.is_unchanged(&fs, &entry("a.build.md", "h2"), target));
        assert!(!ledger.is_unchanged(&fs, &entry("a.build.md", "h1"), Path::new("/out/gone.jsx")));
    }

    #[test]
    fn commits_are_invisible_until_flush() {
        let fs = MemFs::default();
        let path = Path::new("/p/gen-lock.json");
        let mut ledger = Ledger::open(&fs, path).unwrap();
        ledger.commit(&entry("b.build.md", "h2"));
        ledger.commit(&entry("a.build.md", "h1"));
        assert!(fs.get("/p/gen-lock.json").is_none());

        let lock = ledger.flush(&fs).unwrap();
        assert_eq!(lock.get("a.build.md"), Some("h1"));
        assert_eq!(
            fs.get("/p/gen-lock.json").unwrap(),
            "{\n  \"a.build.md\": \"h1\",\n  \"b.build.md\": \"h2\"\n}\n"
        );
    }

    #[test]
    fn corrupt_lock_is_a_configuration_error() {
        let fs = MemFs::with(&[("/p/gen-lock.json", "not json")]);
        let err = Ledger::open(&fs, Path::new("/p/gen-lock.json")).unwrap_err();
        assert!(matches!(err, LedgerError::Parse { .. }), "{err}");
    }
}
