//! Multipart response parsing.
//!
//! The oracle is asked for two delimited blocks:
//!
//! ```text
//! #[CODE]
//! ...implementation...
//! #[CODE-END]
//! #[SIGNATURE]
//! ...public contract...
//! #[SIGNATURE-END]
//! ```
//!
//! Parsing is total. A response without a complete code block degrades to
//! "the whole response is code"; a missing or empty signature block means no
//! sidecar is written.

/// Opens the code block.
pub const CODE_START: &str = "#[CODE]";
/// Closes the code block.
pub const CODE_END: &str = "#[CODE-END]";
/// Opens the signature block.
pub const SIGNATURE_START: &str = "#[SIGNATURE]";
/// Closes the signature block.
pub const SIGNATURE_END: &str = "#[SIGNATURE-END]";

const FENCE: &str = "```";

/// The parsed result of one oracle invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResponse {
    /// Artifact body without banner.
    pub code: String,
    /// Contract text for the sidecar, if the oracle produced one.
    pub signature: Option<String>,
}

impl GenerationResponse {
    /// Split a raw oracle response into code and signature.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let signature_span = block(raw, SIGNATURE_START, SIGNATURE_END);
        let signature = signature_span
            .as_ref()
            .map(|(inner, _)| strip_fence(inner))
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let code = match block(raw, CODE_START, CODE_END) {
            Some((inner, _)) => strip_fence(inner).to_string(),
            None => {
                let mut rest = raw.to_string();
                if let Some((_, range)) = &signature_span {
                    rest.replace_range(range.clone(), "");
                }
                strip_fence(rest.trim()).to_string()
            }
        };
        Self { code, signature }
    }
}

/// Find the first `start … end` block, returning its inner text and the
/// byte range of the whole block including delimiters.
fn block<'a>(
    raw: &'a str,
    start: &str,
    end: &str,
) -> Option<(&'a str, std::ops::Range<usize>)> {
    let open = raw.find(start)?;
    let body = open + start.len();
    let close = body + raw[body..].find(end)?;
    Some((&raw[body..close], open..close + end.len()))
}

/// Remove one layer of markdown fencing around `text`, if present.
pub(crate) fn strip_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(after_open) = text.strip_prefix(FENCE) else {
        return text;
    };
    let Some(inner) = after_open.strip_suffix(FENCE) else {
        return text;
    };
    // The opening line may carry a language tag.
    match inner.find('\n') {
        Some(newline) => inner[newline + 1..].trim(),
        None => text,
    }
}
