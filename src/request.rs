//! Request builder: turns a build context into one oracle request.
//!
//! The request is a pure function of its inputs. Identical build context,
//! signatures and stack always produce byte-identical text, so an unchanged
//! manifest hash plus unchanged dependency signatures means an unchanged
//! request. Sections are ordered from highest to lowest priority.

use std::fmt::Write as _;

use thiserror::Error;

use crate::response::{CODE_END, CODE_START, SIGNATURE_END, SIGNATURE_START};
use crate::signature::SignatureEntry;
use crate::stack::StackConfig;

/// Reasons a request cannot be assembled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    /// The entry has no source file name to attribute the request to.
    #[error("source file name is required to build a request")]
    MissingSourceFile,
    /// The build context is empty, so there is nothing to implement.
    #[error("build context for {0} is empty")]
    EmptyBuildContext(String),
}

const RECONCILIATION_RULES: &[&str] = &[
    "The signatures below have priority over every other definition in this request.",
    "A symbol (function, constant, type or component) that is not listed in these signatures \
     MUST NOT be imported or referenced, even if it appears in the interface documentation.",
    "When the documentation names a component but its signature only exposes a differently \
     named function, use the function from the signature. Never invent a name to match the \
     documentation.",
    "Match the declared export kind exactly: a default export is imported as \
     `import Name from 'path'`, a named export as `import { Name } from 'path'`.",
    "Copy every import path verbatim from the `Component` field. Never recompute it as a \
     relative path.",
    "Respect the return types shown in the signatures when using each symbol.",
];

const GENERATION_RULES: &[&str] = &[
    "Interact with other components only through the methods declared in the dependency \
     interfaces.",
    "Implement every capability of the source file. Business Logic, Domain and Backend \
     modules export their functions.",
    "Translate each capability flow step by step into imperative code.",
    "Presentation components expose a single public export and Business Logic modules \
     contain no user interface code.",
    "Put the whole implementation in a single file. Produce complete code, never mocks, \
     partial implementations or placeholders.",
];

fn numbered(out: &mut String, rules: impl IntoIterator<Item = impl AsRef<str>>) {
    for (i, rule) in rules.into_iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, rule.as_ref());
    }
}

fn persona_section(stack: &StackConfig, source_file: &str) -> String {
    format!(
        "{persona}\n\nYou compile intent specifications into production code.\n\
         Target stack ({id}): {tech}.\nYou are implementing: {source_file}",
        persona = stack.prompt_persona.trim(),
        id = stack.id,
        tech = stack.tech_stack.join(", "),
    )
}

fn reconciliation_section(signatures: &[SignatureEntry]) -> String {
    let mut out = String::from("## REAL IMPLEMENTATION CONTEXT\n");
    numbered(&mut out, RECONCILIATION_RULES);
    if signatures.is_empty() {
        out.push_str("\nNo dependency has been generated yet, so no symbol may be imported \
                       from generated code.\n");
    }
    for sig in signatures {
        let _ = write!(out, "\nComponent: {}\nSignature:\n{}\n", sig.path, sig.signature.trim_end());
    }
    out
}

fn rules_section(stack: &StackConfig) -> String {
    let mut out = String::from("## RULES\n");
    let rules = GENERATION_RULES
        .iter()
        .copied()
        .chain(stack.constraints.iter().map(String::as_str))
        .chain(stack.safety_constraints.iter().map(String::as_str));
    numbered(&mut out, rules);
    out
}

fn output_contract_section() -> String {
    format!(
        "## OUTPUT FORMAT\n\
         Return exactly two blocks and nothing else: no prose and no markdown fences.\n\n\
         {CODE_START}\n(the complete implementation)\n{CODE_END}\n\n\
         {SIGNATURE_START}\n(the public contract of the exports defined in this file only)\n\
         {SIGNATURE_END}\n"
    )
}

fn signature_format_section(stack: &StackConfig) -> String {
    format!("## SIGNATURE FORMAT\n{}\n", stack.signature_format.trim())
}

fn build_context_section(build_context: &str) -> String {
    format!("## BUILD CONTEXT\n{build_context}")
}

/// Assemble the request text for one entry.
///
/// # Errors
///
/// Fails when `source_file` or `build_context` is blank.
pub fn build_request(
    source_file: &str,
    build_context: &str,
    signatures: &[SignatureEntry],
    stack: &StackConfig,
) -> Result<String, RequestError> {
    let source_file = source_file.trim();
    if source_file.is_empty() {
        return Err(RequestError::MissingSourceFile);
    }
    if build_context.trim().is_empty() {
        return Err(RequestError::EmptyBuildContext(source_file.to_string()));
    }

    let sections = [
        persona_section(stack, source_file),
        reconciliation_section(signatures),
        rules_section(stack),
        output_contract_section(),
        signature_format_section(stack),
        build_context_section(build_context),
    ];
    Ok(sections.join("\n\n"))
}
