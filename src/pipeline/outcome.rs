//! Per-entry outcomes and the run summary.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Why an entry was not generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The entry declares no implementation path.
    NoImplementation,
    /// Hash matches the lock and the artifact exists.
    Unchanged,
}

/// Why an entry was (re)generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateReason {
    /// The artifact did not exist.
    Created,
    /// The artifact exists but the entry's hash changed.
    Changed,
    /// Force mode.
    Forced,
}

/// Step at which an entry failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Reading the entry's build context.
    BuildContext,
    /// Another entry already claimed the same target path this run.
    Conflict,
    /// Assembling the request.
    Request,
    /// Invoking the oracle.
    Oracle,
    /// Interpreting the oracle's response.
    Parse,
    /// Writing the artifact or its sidecar.
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BuildContext => "build context",
            Self::Conflict => "conflict",
            Self::Request => "request",
            Self::Oracle => "oracle",
            Self::Parse => "parse",
            Self::Write => "write",
        };
        f.write_str(name)
    }
}

/// Terminal state of one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Not generated; nothing was written and the lock is untouched.
    Skipped {
        /// Source specification file name.
        source: String,
        /// Why it was skipped.
        reason: SkipReason,
    },
    /// Artifact written and committed to the ledger.
    Committed {
        /// Source specification file name.
        source: String,
        /// Artifact path.
        target: PathBuf,
        /// Why it was generated.
        reason: GenerateReason,
        /// Whether a signature sidecar was written.
        signature: bool,
    },
    /// Processing stopped; the entry stays uncommitted and is retried next run.
    Failed {
        /// Source specification file name.
        source: String,
        /// Step that failed.
        stage: Stage,
        /// Error text.
        reason: String,
    },
}

impl EntryOutcome {
    /// Source specification file name of the entry.
    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            Self::Skipped { source, .. }
            | Self::Committed { source, .. }
            | Self::Failed { source, .. } => source,
        }
    }
}

/// Totals for one run, plus every entry's outcome in manifest order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Entries committed this run.
    pub generated: usize,
    /// Entries skipped.
    pub skipped: usize,
    /// Entries that failed.
    pub failed: usize,
    /// Outcomes in manifest order.
    pub outcomes: Vec<EntryOutcome>,
    /// Wall time as measured by the clock port.
    pub elapsed: Duration,
}

impl RunSummary {
    pub(crate) fn new(outcomes: Vec<EntryOutcome>, elapsed: Duration) -> Self {
        let count = |pred: fn(&EntryOutcome) -> bool| outcomes.iter().filter(|o| pred(o)).count();
        Self {
            generated: count(|o| matches!(o, EntryOutcome::Committed { .. })),
            skipped: count(|o| matches!(o, EntryOutcome::Skipped { .. })),
            failed: count(|o| matches!(o, EntryOutcome::Failed { .. })),
            outcomes,
            elapsed,
        }
    }

    /// True when no entry failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Generated: {}, Skipped: {}, Failed: {} ({:.2}s)",
            self.generated,
            self.skipped,
            self.failed,
            self.elapsed.as_secs_f64()
        )
    }
}
