//! In-memory port fakes shared by unit tests.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use crate::context::ServiceContext;
use crate::ports::{Clock, CompletionFuture, CompletionRequest, CompletionResponse, FileSystem, LlmClient};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Filesystem backed by a shared map. Clones see the same files.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemFs {
    files: Arc<Mutex<BTreeMap<PathBuf, String>>>,
    read_only: Arc<Mutex<BTreeSet<PathBuf>>>,
}

impl MemFs {
    pub(crate) fn with(files: &[(&str, &str)]) -> Self {
        let fs = Self::default();
        for (path, contents) in files {
            fs.put(path, contents);
        }
        fs
    }

    pub(crate) fn put(&self, path: &str, contents: &str) {
        self.files.lock().unwrap().insert(PathBuf::from(path), contents.to_string());
    }

    pub(crate) fn get(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(Path::new(path)).cloned()
    }

    /// Make every later write to `path` fail.
    pub(crate) fn deny_writes(&self, path: &str) {
        self.read_only.lock().unwrap().insert(PathBuf::from(path));
    }

    pub(crate) fn remove(&self, path: &str) {
        self.files.lock().unwrap().remove(Path::new(path));
    }
}

impl FileSystem for MemFs {
    fn read_to_string(&self, path: &Path) -> Result<String, BoxError> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| format!("{} not found", path.display()).into())
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), BoxError> {
        if self.read_only.lock().unwrap().contains(path) {
            return Err(format!("{}: permission denied", path.display()).into());
        }
        self.files.lock().unwrap().insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path) || self.is_dir(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.files.lock().unwrap().keys().any(|p| p != path && p.starts_with(path))
    }
}

/// Oracle that answers from a script and remembers every prompt it saw.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedLlm {
    replies: Arc<Mutex<VecDeque<Result<String, String>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedLlm {
    pub(crate) fn reply(&self, text: &str) -> &Self {
        self.replies.lock().unwrap().push_back(Ok(text.to_string()));
        self
    }

    pub(crate) fn fail(&self, message: &str) -> &Self {
        self.replies.lock().unwrap().push_back(Err(message.to_string()));
        self
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl LlmClient for ScriptedLlm {
    fn complete(&self, request: &CompletionRequest) -> CompletionFuture<'_> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        let next = self.replies.lock().unwrap().pop_front();
        Box::pin(async move {
            match next {
                Some(Ok(text)) => {
                    Ok(CompletionResponse { text, prompt_tokens: 0, completion_tokens: 0 })
                }
                Some(Err(message)) => Err(message.into()),
                None => Err("scripted oracle has no reply left".into()),
            }
        })
    }
}

/// Clock frozen at a fixed instant.
pub(crate) struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }
}

/// Context wired to the given fakes.
pub(crate) fn context(fs: &MemFs, llm: &ScriptedLlm) -> ServiceContext {
    ServiceContext::new(Box::new(FixedClock), Box::new(fs.clone()), Box::new(llm.clone()))
}
