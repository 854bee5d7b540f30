//! Review sub-pipeline: a one-shot oracle verdict on a generated file.
//!
//! Reviews never block generation. Whatever goes wrong with the oracle or
//! its answer, the caller gets a non-approving [`ReviewResult`] instead of an
//! error; only a missing or unreadable file is reported as [`ReviewError`].

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::context::ServiceContext;
use crate::ports::CompletionRequest;
use crate::response::strip_fence;
use crate::signature::SignatureEntry;
use crate::stack::StackConfig;

/// Suggestion reported when the review itself could not be completed.
pub const REVIEW_FAILED: &str = "Review process failed internally.";

const GUIDELINES: &[&str] = &[
    "Correctness: does the code compile and run? Are there syntax errors?",
    "Contract compliance: are imports and exports used exactly as the dependency signatures \
     declare them (for example a named export imported as default)?",
    "Stack practices: stale closures, missing effect dependencies, hooks returning unstable \
     functions, null or undefined access without checks.",
    "Logic: infinite loops, off-by-one errors and other obvious flaws.",
];

/// Errors that prevent a review from starting.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// The file to review does not exist.
    #[error("file not found: {0}")]
    NotFound(PathBuf),
    /// The file exists but could not be read.
    #[error("failed to read {path}: {message}")]
    Read {
        /// File being reviewed.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },
    /// The oracle's answer is not a review verdict.
    #[error("malformed review response: {0}")]
    Malformed(String),
}

/// The oracle's verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResult {
    /// True when no critical issue was found.
    pub approved: bool,
    /// Actionable fixes; empty when approved.
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl ReviewResult {
    /// The verdict used when the review could not be completed.
    #[must_use]
    pub fn failed() -> Self {
        Self { approved: false, suggestions: vec![REVIEW_FAILED.to_string()] }
    }
}

/// Assemble the review request. Deterministic in its inputs.
#[must_use]
pub fn build_review_prompt(
    code: &str,
    file_name: &str,
    signatures: &[SignatureEntry],
    stack: &StackConfig,
) -> String {
    let lang = Path::new(file_name).extension().and_then(|e| e.to_str()).unwrap_or("");
    let mut out = format!(
        "You are a senior code reviewer for the {id} stack. Find logical bugs, architectural \
         violations and stack-specific anti-patterns in the file below.\n\n\
         ## CONTEXT\nFile name: {file_name}\nStack: {tech}\n",
        id = stack.id,
        tech = stack.tech_stack.join(", "),
    );
    if !signatures.is_empty() {
        out.push_str("\n## DEPENDENCY SIGNATURES (contracts the file must respect)\n");
        for sig in signatures {
            let _ = write!(out, "\nModule: {}\n{}\n", sig.path, sig.signature.trim_end());
        }
    }
    let _ = write!(
        out,
        "\n## CODE TO REVIEW\n```{lang}\n{}\n```\n\n## REVIEW GUIDELINES\n",
        code.trim_end()
    );
    for (i, rule) in GUIDELINES.iter().enumerate() {
        let _ = writeln!(out, "{}. {rule}", i + 1);
    }
    out.push_str(
        "\n## OUTPUT FORMAT\n\
         Answer with one raw JSON object and nothing else, no markdown fences:\n\
         {\"approved\": boolean, \"suggestions\": [string]}\n\
         `approved` is false when a critical issue is found; `suggestions` lists specific, \
         actionable fixes and is empty when approved.\n",
    );
    out
}

/// Decode the oracle's answer, tolerating one layer of fencing.
///
/// # Errors
///
/// Returns [`ReviewError::Malformed`] if the answer is not the expected JSON.
pub fn parse_review(raw: &str) -> Result<ReviewResult, ReviewError> {
    serde_json::from_str(strip_fence(raw)).map_err(|e| ReviewError::Malformed(e.to_string()))
}

/// Runs reviews against the context's oracle.
pub struct Reviewer<'a> {
    ctx: &'a ServiceContext,
    stack: &'a StackConfig,
    model: String,
    max_tokens: u32,
}

impl<'a> Reviewer<'a> {
    /// Create a reviewer using `model` with a `max_tokens` completion budget.
    #[must_use]
    pub fn new(
        ctx: &'a ServiceContext,
        stack: &'a StackConfig,
        model: &str,
        max_tokens: u32,
    ) -> Self {
        Self { ctx, stack, model: model.to_string(), max_tokens }
    }

    /// Review the file at `path` against its dependencies' `signatures`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the file is missing or unreadable. Oracle
    /// and parse failures produce [`ReviewResult::failed`].
    pub async fn review(
        &self,
        path: &Path,
        signatures: &[SignatureEntry],
    ) -> Result<ReviewResult, ReviewError> {
        let fs = self.ctx.fs.as_ref();
        if !fs.exists(path) {
            return Err(ReviewError::NotFound(path.to_path_buf()));
        }
        let code = fs
            .read_to_string(path)
            .map_err(|e| ReviewError::Read { path: path.to_path_buf(), message: e.to_string() })?;
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("unknown");

        let prompt = build_review_prompt(&code, file_name, signatures, self.stack);
        debug!(file = file_name, chars = prompt.len(), "review request assembled");
        info!(file = file_name, signatures = signatures.len(), "reviewing");

        let request = CompletionRequest {
            model: self.model.clone(),
            prompt,
            max_tokens: self.max_tokens,
            temperature: 0.0,
        };
        let verdict = match self.ctx.llm.complete(&request).await {
            Ok(response) => parse_review(&response.text),
            Err(e) => {
                error!(file = file_name, error = %e, "review oracle call failed");
                return Ok(ReviewResult::failed());
            }
        };
        Ok(verdict.unwrap_or_else(|e| {
            error!(file = file_name, error = %e, "review response could not be parsed");
            ReviewResult::failed()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::presets;
    use crate::testing::{self, MemFs, ScriptedLlm};

    #[test]
    fn prompt_carries_code_signatures_and_schema() {
        let stack = presets::default_stack();
        let sigs = [SignatureEntry {
            path: "./domain".into(),
            signature: "export function a(): void".into(),
        }];
        let prompt = build_review_prompt("const x = 1;\n", "ui.jsx", &sigs, &stack);

        assert!(prompt.contains("react-js"));
        assert!(prompt.contains("File name: ui.jsx"));
        assert!(prompt.contains("Module: ./domain\nexport function a(): void"));
        assert!(prompt.contains("```jsx\nconst x = 1;\n```"));
        assert!(prompt.contains("{\"approved\": boolean, \"suggestions\": [string]}"));
        assert_eq!(prompt, build_review_prompt("const x = 1;\n", "ui.jsx", &sigs, &stack));
    }

    #[test]
    fn parse_accepts_fenced_json() {
        let raw = "```json\n{\"approved\": false, \"suggestions\": [\"fix\"]}\n```";
        let parsed = parse_review(raw).unwrap();
        assert_eq!(parsed, ReviewResult { approved: false, suggestions: vec!["fix".into()] });

        let parsed = parse_review(" {\"approved\": true} ").unwrap();
        assert!(parsed.approved && parsed.suggestions.is_empty());

        assert!(matches!(parse_review("looks good to me"), Err(ReviewError::Malformed(_))));
    }

    #[tokio::test]
    async fn review_returns_oracle_verdict() {
        let fs = MemFs::with(&[("/p/bin/ui.jsx", "export default 1;")]);
        let llm = ScriptedLlm::default();
        llm.reply("{\"approved\": true, \"suggestions\": []}");
        let ctx = testing::context(&fs, &llm);
        let stack = presets::default_stack();

        let result = Reviewer::new(&ctx, &stack, "m", 1024)
            .review(Path::new("/p/bin/ui.jsx"), &[])
            .await
            .unwrap();
        assert!(result.approved);
        assert!(llm.prompts()[0].contains("export default 1;"));
    }

    #[tokio::test]
    async fn review_is_fail_safe() {
        let fs = MemFs::with(&[("/a.js", "x")]);
        let llm = ScriptedLlm::default();
        llm.fail("boom").reply("not json");
        let ctx = testing::context(&fs, &llm);
        let stack = presets::default_stack();
        let reviewer = Reviewer::new(&ctx, &stack, "m", 1024);

        for _ in 0..2 {
            let result = reviewer.review(Path::new("/a.js"), &[]).await.unwrap();
            assert_eq!(result, ReviewResult::failed());
        }
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let fs = MemFs::default();
        let llm = ScriptedLlm::default();
        let ctx = testing::context(&fs, &llm);
        let stack = presets::default_stack();

        let err = Reviewer::new(&ctx, &stack, "m", 1024)
            .review(Path::new("/nope.js"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::NotFound(_)));
        assert!(llm.prompts().is_empty());
    }
}
