//! `islgen review` command.

use std::path::Path;

use super::block_on;
use crate::context::ServiceContext;
use crate::review::{ReviewResult, Reviewer};
use crate::signature;
use crate::stack::StackConfig;

/// Arguments for one review.
#[derive(Debug)]
pub struct ReviewRequest<'a> {
    /// File to review.
    pub file: &'a Path,
    /// Build context naming the file's dependencies.
    pub build_file: Option<&'a Path>,
    /// Directory the dependency sidecars live in.
    pub output_dir: Option<&'a Path>,
    /// Oracle model.
    pub model: String,
    /// Completion budget.
    pub max_tokens: u32,
}

/// Execute the `review` command.
///
/// # Errors
///
/// Returns an error string if the file or build context cannot be read, or
/// if the review does not approve the file.
pub fn run(
    ctx: &ServiceContext,
    stack: &StackConfig,
    request: &ReviewRequest<'_>,
) -> Result<(), String> {
    let signatures = match request.build_file {
        Some(build_file) => {
            let context = ctx
                .fs
                .read_to_string(build_file)
                .map_err(|e| format!("failed to read {}: {e}", build_file.display()))?;
            let output_dir = request
                .output_dir
                .or_else(|| request.file.parent())
                .unwrap_or_else(|| Path::new("."));
            signature::collect(ctx.fs.as_ref(), &context, stack, output_dir)
        }
        None => Vec::new(),
    };

    let reviewer = Reviewer::new(ctx, stack, &request.model, request.max_tokens);
    let result =
        block_on(reviewer.review(request.file, &signatures))?.map_err(|e| e.to_string())?;

    print!("{}", render(request.file, &result));
    if result.approved {
        Ok(())
    } else {
        Err(format!("review did not approve {}", request.file.display()))
    }
}

fn render(file: &Path, result: &ReviewResult) -> String {
    let verdict = if result.approved { "APPROVED" } else { "CHANGES REQUESTED" };
    let mut out = format!("{verdict}: {}\n", file.display());
    for suggestion in &result.suggestions {
        out.push_str(&format!("  - {suggestion}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_lists_suggestions() {
        let result = ReviewResult {
            approved: false,
            suggestions: vec!["import makeCard as a named export".into()],
        };
        assert_eq!(
            render(Path::new("bin/ui.jsx"), &result),
            "CHANGES REQUESTED: bin/ui.jsx\n  - import makeCard as a named export\n"
        );
    }
}
