//! Live filesystem adapter using `std::fs`.

use std::path::{Path, PathBuf};

use crate::ports::filesystem::FileSystem;

/// Live filesystem adapter backed by real disk I/O.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// destination, so readers never observe a half-written artifact or lock.
pub struct LiveFileSystem;

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".islgen-tmp");
    path.with_file_name(name)
}

impl FileSystem for LiveFileSystem {
    fn read_to_string(
        &self,
        path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn write(
        &self,
        path: &Path,
        contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let staging = staging_path(path);
        std::fs::write(&staging, contents)?;
        if let Err(e) = std::fs::rename(&staging, path) {
            let _ = std::fs::remove_file(&staging);
            return Err(e.into());
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_parents_and_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/deeper/out.js");
        let fs = LiveFileSystem;

        fs.write(&target, "first").unwrap();
        fs.write(&target, "second").unwrap();

        assert_eq!(fs.read_to_string(&target).unwrap(), "second");
        assert!(!staging_path(&target).exists());
        assert!(fs.is_dir(&dir.path().join("nested")));
        assert!(!fs.is_dir(&target));
    }

    #[test]
    fn read_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LiveFileSystem;
        assert!(fs.read_to_string(&dir.path().join("nope")).is_err());
        assert!(!fs.exists(&dir.path().join("nope")));
    }
}
