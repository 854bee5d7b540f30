//! Service context bundling all port trait objects.

use std::path::Path;

use crate::adapters::live::clock::LiveClock;
use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::live::llm::{LiveLlmClient, LlmProvider};
use crate::adapters::recording::{RecordingClock, RecordingFileSystem, RecordingLlmClient};
use crate::adapters::replaying::{ReplayingClock, ReplayingFileSystem, ReplayingLlmClient};
use crate::cassette::config::CassetteConfig;
use crate::cassette::session::RecordingSession;
use crate::ports::{Clock, FileSystem, LlmClient};

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors wire up
/// live or recording adapters; [`ServiceContext::with_replay`] swaps in
/// replaying ones.
pub struct ServiceContext {
    /// Clock for measuring run duration.
    pub clock: Box<dyn Clock>,
    /// Filesystem for manifests, build contexts, artifacts and the lock.
    pub fs: Box<dyn FileSystem>,
    /// The generation oracle.
    pub llm: Box<dyn LlmClient>,
}

impl ServiceContext {
    /// Bundle explicit adapters.
    #[must_use]
    pub fn new(clock: Box<dyn Clock>, fs: Box<dyn FileSystem>, llm: Box<dyn LlmClient>) -> Self {
        Self { clock, fs, llm }
    }

    /// Creates a live context talking to `provider`.
    #[must_use]
    pub fn live(provider: LlmProvider) -> Self {
        Self::new(
            Box::new(LiveClock),
            Box::new(LiveFileSystem),
            Box::new(LiveLlmClient::new(provider)),
        )
    }

    /// Creates a live context whose port interactions are recorded into
    /// per-port cassettes under `dir`.
    ///
    /// The returned session must be finished after the context is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the session directory cannot be prepared.
    pub fn recording_at(
        dir: &Path,
        provider: LlmProvider,
    ) -> Result<(Self, RecordingSession), String> {
        let session = RecordingSession::new(dir)?;
        let ctx = Self::new(
            Box::new(RecordingClock::new(Box::new(LiveClock), session.clock.clone())),
            Box::new(RecordingFileSystem::new(Box::new(LiveFileSystem), session.fs.clone())),
            Box::new(RecordingLlmClient::new(
                Box::new(LiveLlmClient::new(provider)),
                session.llm.clone(),
            )),
        );
        Ok((ctx, session))
    }

    /// Replace every port that has a cassette in `config` with a replaying
    /// adapter, keeping the current adapter for the others.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or parsed.
    pub fn with_replay(mut self, config: &CassetteConfig) -> Result<Self, String> {
        let replayers = config.load_all()?;
        if let Some(r) = replayers.clock {
            self.clock = Box::new(ReplayingClock::new(r));
        }
        if let Some(r) = replayers.fs {
            self.fs = Box::new(ReplayingFileSystem::new(r));
        }
        if let Some(r) = replayers.llm {
            self.llm = Box::new(ReplayingLlmClient::new(r));
        }
        Ok(self)
    }
}
