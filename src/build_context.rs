//! Marker grammar for build contexts.
//!
//! A build context is the text bundle produced by the planning step for one
//! manifest entry: zero or more dependency interface sections followed by the
//! entry's own source. Markers are matched on trimmed lines:
//!
//! ```text
//! <!-- START DEPENDENCY INTERFACE: store.ref.md -->
//! <!-- IMPLEMENTATION PATH: ./store -->
//! **Role**: Business Logic
//! <!-- END DEPENDENCY INTERFACE -->
//! <!-- SOURCE FILE TO IMPLEMENT -->
//! **Role**: Presentation
//! ```
//!
//! Role declarations are a heading (`### Role: Backend`) or a bold key
//! (`**Role**: Presentation`, `**Role:** Domain`), optionally behind `-`/`>`
//! bullets. A plain `role:` line is an ordinary field, not a declaration.

use crate::stack::Role;

/// Opens a dependency interface section; the section name follows the colon.
pub const DEPENDENCY_START: &str = "<!-- START DEPENDENCY INTERFACE:";
/// Closes a dependency interface section.
pub const DEPENDENCY_END: &str = "<!-- END DEPENDENCY INTERFACE -->";
/// Declares a dependency's implementation path inside its section.
pub const IMPLEMENTATION_PATH: &str = "<!-- IMPLEMENTATION PATH:";
/// Separates dependency interfaces from the entry's own source.
pub const SOURCE_MARKER: &str = "<!-- SOURCE FILE TO IMPLEMENT -->";

const COMMENT_CLOSE: &str = "-->";

/// One dependency interface declared in a build context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyInterface<'a> {
    /// Section name (usually the dependency's interface file name).
    pub name: &'a str,
    /// Declared implementation path, if any.
    pub implementation_path: Option<&'a str>,
    /// Role declared inside the dependency's section.
    pub role: Role,
}

/// A build context split along its markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext<'a> {
    /// Dependency sections, in order of appearance.
    pub dependencies: Vec<DependencyInterface<'a>>,
    /// Text strictly after the source marker (the whole text without one).
    pub source: &'a str,
}

impl<'a> BuildContext<'a> {
    /// Split `text` into dependency sections and the source section.
    #[must_use]
    pub fn parse(text: &'a str) -> Self {
        let (head, source) = match text.find(SOURCE_MARKER) {
            Some(at) => (&text[..at], &text[at + SOURCE_MARKER.len()..]),
            None => (text, text),
        };
        Self { dependencies: parse_dependencies(head), source }
    }

    /// The entry's own role, read from the source section only so that a
    /// dependency's declaration is never attributed to the entry.
    #[must_use]
    pub fn role(&self) -> Role {
        detect_role(self.source)
    }
}

/// Return the inner value of a `<!-- TOKEN value -->` line.
fn marker_value<'a>(line: &'a str, token: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(token)?;
    let rest = rest.strip_suffix(COMMENT_CLOSE).unwrap_or(rest);
    Some(rest.trim())
}

fn parse_dependencies(head: &str) -> Vec<DependencyInterface<'_>> {
    let mut out = Vec::new();
    let mut current: Option<(DependencyInterface<'_>, bool)> = None;

    for line in head.lines().map(str::trim) {
        if let Some(name) = marker_value(line, DEPENDENCY_START) {
            if let Some((dep, _)) = current.take() {
                out.push(dep);
            }
            let dep = DependencyInterface { name, implementation_path: None, role: Role::Default };
            current = Some((dep, false));
            continue;
        }
        let Some((dep, role_seen)) = current.as_mut() else {
            continue;
        };
        if line == DEPENDENCY_END {
            if let Some((dep, _)) = current.take() {
                out.push(dep);
            }
        } else if let Some(path) = marker_value(line, IMPLEMENTATION_PATH) {
            if dep.implementation_path.is_none() && !path.is_empty() {
                dep.implementation_path = Some(path);
            }
        } else if !*role_seen {
            if let Some(value) = role_value(line) {
                dep.role = Role::parse(value);
                *role_seen = true;
            }
        }
    }
    if let Some((dep, _)) = current {
        out.push(dep);
    }
    out
}

/// Find the first role declaration in `section`.
#[must_use]
pub fn detect_role(section: &str) -> Role {
    section.lines().find_map(role_value).map_or(Role::Default, Role::parse)
}

fn role_value(line: &str) -> Option<&str> {
    let rest = line.trim().trim_start_matches(['>', '-']).trim_start();
    let heading = rest.starts_with('#');
    let rest = rest.trim_start_matches('#').trim_start();
    let (rest, bold) = match rest.strip_prefix("**") {
        Some(rest) => (rest, true),
        None => (rest, false),
    };
    if !heading && !bold {
        return None;
    }
    if !rest.get(..4)?.eq_ignore_ascii_case("role") {
        return None;
    }
    let rest = &rest[4..];
    let rest = rest.strip_prefix("**").unwrap_or(rest).trim_start();
    let rest = rest.strip_prefix(':')?;
    let rest = rest.strip_prefix("**").unwrap_or(rest);
    let value = rest.trim().trim_matches(['*', '`']).trim();
    (!value.is_empty()).then_some(value)
}
