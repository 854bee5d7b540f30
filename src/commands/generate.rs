//! `islgen generate` command.

use std::path::Path;

use super::block_on;
use crate::context::ServiceContext;
use crate::layout::ProjectLayout;
use crate::pipeline::{EntryOutcome, GenerateOptions, RunSummary, Runner};
use crate::stack::StackConfig;

/// Execute the `generate` command.
///
/// # Errors
///
/// Returns an error string if the manifest or lock cannot be loaded or
/// flushed, or if any entry failed (after the lock has been flushed).
pub fn run(
    ctx: &ServiceContext,
    manifest: &Path,
    output_dir: Option<&Path>,
    stack: &StackConfig,
    options: &GenerateOptions,
) -> Result<(), String> {
    let layout = ProjectLayout::resolve(ctx.fs.as_ref(), manifest, output_dir);
    let runner = Runner::new(ctx, &layout, stack, options);
    let summary = block_on(runner.run())?.map_err(|e| e.to_string())?;

    print!("{}", render(&summary));
    if summary.is_success() {
        Ok(())
    } else {
        Err(format!("{} of {} entries failed", summary.failed, summary.outcomes.len()))
    }
}

/// Human-readable run report.
fn render(summary: &RunSummary) -> String {
    let mut out = String::new();
    for outcome in &summary.outcomes {
        if let EntryOutcome::Failed { source, stage, reason } = outcome {
            out.push_str(&format!("FAILED {source} ({stage}): {reason}\n"));
        }
    }
    out.push_str(&format!("Generation completed. {summary}\n"));
    out
}
