//! Where a project's manifest, lock and generated output live.

use std::path::{Path, PathBuf};

use crate::ledger::LOCK_FILE_NAME;
use crate::ports::FileSystem;

/// Manifest file name produced by the planning step.
pub const MANIFEST_FILE_NAME: &str = "build-manifest.json";
/// Directory the planning step writes build contexts into.
const BUILD_DIR: &str = "build";
/// Default output directory under the project root.
const OUTPUT_DIR: &str = "bin";

/// Resolved paths for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Project root.
    pub root: PathBuf,
    /// Manifest file.
    pub manifest: PathBuf,
    /// Lock file, next to the manifest.
    pub lock: PathBuf,
    /// Output base directory for artifacts and sidecars.
    pub output_dir: PathBuf,
}

impl ProjectLayout {
    /// Resolve the layout from a manifest file or project directory.
    #[must_use]
    pub fn resolve(fs: &dyn FileSystem, manifest_arg: &Path, output: Option<&Path>) -> Self {
        let (root, manifest) = if fs.is_dir(manifest_arg) {
            let direct = manifest_arg.join(MANIFEST_FILE_NAME);
            let nested = manifest_arg.join(BUILD_DIR).join(MANIFEST_FILE_NAME);
            let manifest = if !fs.exists(&direct) && fs.exists(&nested) { nested } else { direct };
            (manifest_arg.to_path_buf(), manifest)
        } else {
            (project_root_of(manifest_arg), manifest_arg.to_path_buf())
        };
        let lock = manifest.parent().unwrap_or_else(|| Path::new("")).join(LOCK_FILE_NAME);
        let output_dir = output.map_or_else(|| root.join(OUTPUT_DIR), Path::to_path_buf);
        Self { root, manifest, lock, output_dir }
    }
}

fn project_root_of(manifest: &Path) -> PathBuf {
    let parent = manifest.parent().unwrap_or_else(|| Path::new(""));
    if parent.file_name().is_some_and(|name| name == BUILD_DIR) {
        parent.parent().unwrap_or(parent).to_path_buf()
    } else {
        parent.to_path_buf()
    }
}
