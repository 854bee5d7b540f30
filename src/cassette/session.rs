//! Recording session managing per-port cassette recorders.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::recorder::CassetteRecorder;

/// Shared handle to a recorder; recording adapters lock it for each call.
pub type SharedRecorder = Arc<Mutex<CassetteRecorder>>;

/// Manages one `CassetteRecorder` per port, all writing into one directory.
pub struct RecordingSession {
    /// Recorder for oracle interactions.
    pub llm: SharedRecorder,
    /// Recorder for filesystem interactions.
    pub fs: SharedRecorder,
    /// Recorder for clock interactions.
    pub clock: SharedRecorder,
    output_dir: PathBuf,
}

impl RecordingSession {
    /// Create a session writing `<port>.cassette.yaml` files into `output_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory already holds cassettes or cannot be created.
    pub fn new(output_dir: &Path) -> Result<Self, String> {
        if output_dir.join("llm.cassette.yaml").exists() {
            return Err(format!(
                "Cassette directory already contains a recording: {}",
                output_dir.display()
            ));
        }
        std::fs::create_dir_all(output_dir)
            .map_err(|e| format!("Failed to create cassette directory: {e}"))?;

        let make_recorder = |port: &str| -> SharedRecorder {
            let path = output_dir.join(format!("{port}.cassette.yaml"));
            Arc::new(Mutex::new(CassetteRecorder::new(path, format!("islgen-{port}"))))
        };

        Ok(Self {
            llm: make_recorder("llm"),
            fs: make_recorder("fs"),
            clock: make_recorder("clock"),
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Finish all recorders and write cassette files to disk.
    ///
    /// Every adapter holding a recorder handle must have been dropped first.
    ///
    /// # Errors
    ///
    /// Returns an error if a recorder is still shared or a file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        fn finish_one(arc: SharedRecorder, port: &str) -> Result<(), String> {
            let recorder = Arc::try_unwrap(arc)
                .map_err(|_| format!("Recording adapter for {port} still has references"))?
                .into_inner()
                .map_err(|e| format!("Recorder lock for {port} poisoned: {e}"))?;
            recorder.finish().map_err(|e| format!("Failed to write {port} cassette: {e}"))?;
            Ok(())
        }

        finish_one(self.llm, "llm")?;
        finish_one(self.fs, "fs")?;
        finish_one(self.clock, "clock")?;
        Ok(self.output_dir)
    }
}
