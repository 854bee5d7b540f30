//! The generation pipeline.
//!
//! Entries are processed one at a time in manifest order. Each entry is
//! either skipped, or taken through
//! `GENERATING → PARSED → WRITTEN → COMMITTED`; a failure at any step leaves
//! it uncommitted so the next run retries it. The lock is flushed once, after
//! the last entry, whatever the individual outcomes were.
//!
//! Ordering matters: a dependent's request includes the signature sidecars
//! its dependencies wrote earlier in the same run, so the manifest must list
//! dependencies first. The runner does not check this.

pub mod artifact;
pub mod outcome;

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::adapters::live::llm::LlmProvider;
use crate::build_context::BuildContext;
use crate::context::ServiceContext;
use crate::layout::ProjectLayout;
use crate::ledger::{Ledger, LedgerError, Manifest, ManifestEntry};
use crate::ports::CompletionRequest;
use crate::request::build_request;
use crate::response::GenerationResponse;
use crate::signature::{self, sidecar_path};
use crate::stack::StackConfig;

pub use outcome::{EntryOutcome, GenerateReason, RunSummary, SkipReason, Stage};

/// Debug dumps go here under the output directory unless overridden.
pub const DEFAULT_DEBUG_DIR: &str = "promptDebug";
/// Default completion budget per entry.
pub const DEFAULT_MAX_TOKENS: u32 = 8192;
/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Errors that abort a run before any entry is processed, or while flushing.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Manifest or lock could not be loaded or persisted.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Knobs for one generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    /// Regenerate every entry regardless of the lock.
    pub force: bool,
    /// Write each assembled request to the debug directory.
    pub debug: bool,
    /// Debug directory; defaults to `<output>/promptDebug`.
    pub debug_dir: Option<PathBuf>,
    /// Oracle model identifier.
    pub model: String,
    /// Completion budget per entry.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            force: false,
            debug: false,
            debug_dir: None,
            model: LlmProvider::default().default_model().to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Drives one generation run over a manifest.
pub struct Runner<'a> {
    ctx: &'a ServiceContext,
    layout: &'a ProjectLayout,
    stack: &'a StackConfig,
    options: &'a GenerateOptions,
}

/// Per-run state threaded through entry processing.
struct RunState {
    ledger: Ledger,
    claimed: HashMap<PathBuf, String>,
}

impl<'a> Runner<'a> {
    /// Create a runner.
    #[must_use]
    pub fn new(
        ctx: &'a ServiceContext,
        layout: &'a ProjectLayout,
        stack: &'a StackConfig,
        options: &'a GenerateOptions,
    ) -> Self {
        Self { ctx, layout, stack, options }
    }

    /// Process every manifest entry and flush the lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest or lock cannot be loaded (before any
    /// entry is touched), or if the lock cannot be flushed. Per-entry
    /// failures are reported in the summary instead.
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        let fs = self.ctx.fs.as_ref();
        let started = self.ctx.clock.now();

        let manifest = Manifest::load(fs, &self.layout.manifest)?;
        let ledger = Ledger::open(fs, &self.layout.lock)?;
        info!(
            root = %self.layout.root.display(),
            manifest = %manifest.path().display(),
            output = %self.layout.output_dir.display(),
            stack = %self.stack.id,
            entries = manifest.entries.len(),
            force = self.options.force,
            "starting generation"
        );

        let mut state = RunState { ledger, claimed: HashMap::new() };
        let total = manifest.entries.len();
        let mut outcomes = Vec::with_capacity(total);
        for (i, entry) in manifest.entries.iter().enumerate() {
            let progress = format!("[{}/{total}]", i + 1);
            let outcome = self.process(&manifest, entry, &mut state, &progress).await;
            if let EntryOutcome::Failed { source, stage, reason } = &outcome {
                error!(
                    %progress,
                    entry = %source,
                    %stage,
                    %reason,
                    "entry failed; it will be retried next run"
                );
            }
            outcomes.push(outcome);
        }

        let lock = state.ledger.flush(fs)?;
        debug!(lock = %self.layout.lock.display(), entries = lock.len(), "lock flushed");

        let elapsed = (self.ctx.clock.now() - started).to_std().unwrap_or_default();
        let summary = RunSummary::new(outcomes, elapsed);
        info!(
            generated = summary.generated,
            skipped = summary.skipped,
            failed = summary.failed,
            seconds = summary.elapsed.as_secs_f64(),
            "generation completed"
        );
        let missing_impl = summary.outcomes.iter().any(|o| {
            matches!(o, EntryOutcome::Skipped { reason: SkipReason::NoImplementation, .. })
        });
        if summary.generated == 0 && missing_impl {
            info!(
                "hint: specification files need an '**Implementation**: ./file.ext' header \
                 to be generated"
            );
        }
        Ok(summary)
    }

    async fn process(
        &self,
        manifest: &Manifest,
        entry: &ManifestEntry,
        state: &mut RunState,
        progress: &str,
    ) -> EntryOutcome {
        let fs = self.ctx.fs.as_ref();
        let source = entry.source_name().to_string();
        let fail = |stage: Stage, reason: String| EntryOutcome::Failed {
            source: source.clone(),
            stage,
            reason,
        };

        let Some(implementation) = entry.implementation() else {
            info!(%progress, entry = %source, "skipping: no implementation path declared");
            return EntryOutcome::Skipped { source, reason: SkipReason::NoImplementation };
        };

        let build_path = manifest.build_file_path(entry);
        let build_context = match fs.read_to_string(&build_path) {
            Ok(text) => text,
            Err(e) => {
                return fail(
                    Stage::BuildContext,
                    format!("cannot read {}: {e}", build_path.display()),
                )
            }
        };

        let role = BuildContext::parse(&build_context).role();
        let target = self.stack.target_path(&self.layout.output_dir, implementation, role);
        if let Some(owner) = state.claimed.get(&target) {
            return fail(
                Stage::Conflict,
                format!("target {} is already produced by {owner}", target.display()),
            );
        }
        state.claimed.insert(target.clone(), source.clone());

        if !self.options.force && state.ledger.is_unchanged(fs, entry, &target) {
            info!(%progress, entry = %source, "skipping: unchanged");
            return EntryOutcome::Skipped { source, reason: SkipReason::Unchanged };
        }
        let reason = if self.options.force {
            GenerateReason::Forced
        } else if fs.exists(&target) {
            GenerateReason::Changed
        } else {
            GenerateReason::Created
        };
        info!(
            %progress,
            entry = %source,
            target = %target.display(),
            role = %role,
            reason = ?reason,
            "generating"
        );

        let signatures =
            signature::collect(fs, &build_context, self.stack, &self.layout.output_dir);
        debug!(entry = %source, signatures = signatures.len(), "collected dependency signatures");
        let built = build_request(&entry.source_file, &build_context, &signatures, self.stack);
        let prompt = match built {
            Ok(prompt) => prompt,
            Err(e) => return fail(Stage::Request, e.to_string()),
        };
        if self.options.debug {
            self.dump_request(&source, &prompt);
        }

        let request = CompletionRequest {
            model: self.options.model.clone(),
            prompt,
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
        };
        let raw = match self.ctx.llm.complete(&request).await {
            Ok(response) => {
                debug!(
                    entry = %source,
                    prompt_tokens = response.prompt_tokens,
                    completion_tokens = response.completion_tokens,
                    "oracle responded"
                );
                response.text
            }
            Err(e) => return fail(Stage::Oracle, e.to_string()),
        };

        let parsed = GenerationResponse::parse(&raw);
        if parsed.code.is_empty() {
            return fail(Stage::Parse, "oracle returned no code".into());
        }

        let artifact = artifact::render(self.stack, &source, &parsed.code);
        if let Err(e) = fs.write(&target, &artifact) {
            return fail(Stage::Write, format!("cannot write {}: {e}", target.display()));
        }
        if let Some(sig) = &parsed.signature {
            let sidecar = sidecar_path(&target);
            if let Err(e) = fs.write(&sidecar, &artifact::render_signature(sig)) {
                return fail(Stage::Write, format!("cannot write {}: {e}", sidecar.display()));
            }
            info!(entry = %source, sidecar = %sidecar.display(), "signature saved");
        } else {
            warn!(entry = %source, "response carried no signature block; no sidecar written");
        }

        state.ledger.commit(entry);
        EntryOutcome::Committed { source, target, reason, signature: parsed.signature.is_some() }
    }

    fn debug_dir(&self) -> PathBuf {
        self.options
            .debug_dir
            .clone()
            .unwrap_or_else(|| self.layout.output_dir.join(DEFAULT_DEBUG_DIR))
    }

    /// Best effort: a failed dump never fails the entry.
    fn dump_request(&self, source: &str, prompt: &str) {
        let path = self.debug_dir().join(source);
        match self.ctx.fs.write(&path, prompt) {
            Ok(()) => debug!(entry = %source, path = %path.display(), "request dumped"),
            Err(e) => {
                warn!(entry = %source, path = %path.display(), error = %e, "failed to dump request");
            }
        }
    }
}
