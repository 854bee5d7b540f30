//! Stack configuration: code-generation dialect and file-extension policy.
//!
//! A [`StackConfig`] is static, read-only input to the pipeline. Built-in
//! presets live in [`presets`]; custom stacks can be loaded from YAML.

pub mod presets;
pub mod role;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ports::FileSystem;

pub use role::Role;

/// Errors raised while loading or validating a stack configuration.
#[derive(Debug, Error)]
pub enum StackError {
    /// The stack file could not be read.
    #[error("failed to read stack file {path}: {message}")]
    Read {
        /// Path of the stack file.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },
    /// The stack file is not valid YAML for a stack configuration.
    #[error("failed to parse stack file {path}: {message}")]
    Parse {
        /// Path of the stack file.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },
    /// The stack configuration is structurally invalid.
    #[error("invalid stack configuration: {0}")]
    Invalid(String),
}

/// Role → extension table with a mandatory default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct Extensions {
    default: String,
    by_role: BTreeMap<Role, String>,
}

impl Extensions {
    /// Create a table from a default extension and per-role overrides.
    #[must_use]
    pub fn new(default: &str, by_role: &[(Role, &str)]) -> Self {
        Self {
            default: default.to_string(),
            by_role: by_role
                .iter()
                .filter(|(role, _)| *role != Role::Default)
                .map(|(role, ext)| (*role, (*ext).to_string()))
                .collect(),
        }
    }

    /// Extension for `role`, falling back to the default.
    #[must_use]
    pub fn for_role(&self, role: Role) -> &str {
        self.by_role.get(&role).map_or(self.default.as_str(), String::as_str)
    }

    /// Every distinct extension, default first, then in role order.
    #[must_use]
    pub fn distinct(&self) -> Vec<&str> {
        let mut out = vec![self.default.as_str()];
        for ext in self.by_role.values() {
            if !out.contains(&ext.as_str()) {
                out.push(ext.as_str());
            }
        }
        out
    }

    fn validate(&self) -> Result<(), StackError> {
        for ext in std::iter::once(&self.default).chain(self.by_role.values()) {
            if !ext.starts_with('.') || ext.len() < 2 {
                return Err(StackError::Invalid(format!(
                    "extension '{ext}' must start with '.' and name a suffix"
                )));
            }
        }
        Ok(())
    }
}

impl TryFrom<BTreeMap<String, String>> for Extensions {
    type Error = String;

    fn try_from(mut raw: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let default = raw
            .remove("default")
            .ok_or_else(|| "extensions table is missing the mandatory 'default' key".to_string())?;
        let mut by_role = BTreeMap::new();
        for (key, ext) in raw {
            match Role::parse(&key) {
                Role::Default => return Err(format!("unknown role '{key}' in extensions table")),
                role => {
                    by_role.insert(role, ext);
                }
            }
        }
        Ok(Self { default, by_role })
    }
}

impl From<Extensions> for BTreeMap<String, String> {
    fn from(ext: Extensions) -> Self {
        let mut out: BTreeMap<String, String> =
            ext.by_role.into_iter().map(|(role, e)| (role.as_str().to_string(), e)).collect();
        out.insert("default".to_string(), ext.default);
        out
    }
}

fn default_comment_prefix() -> String {
    "//".to_string()
}

/// Static rule set selecting the target dialect for generated code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackConfig {
    /// Identifier used to select the stack (e.g. `react-js`).
    pub id: String,
    /// Technologies the generated code targets, in priority order.
    pub tech_stack: Vec<String>,
    /// Target file extension per role.
    pub extensions: Extensions,
    /// Persona statement opening every request.
    pub prompt_persona: String,
    /// Stack-specific generation rules.
    #[serde(default)]
    pub constraints: Vec<String>,
    /// Safety rules applied after the stack rules.
    #[serde(default)]
    pub safety_constraints: Vec<String>,
    /// Instructions describing how the signature block must be written.
    pub signature_format: String,
    /// Line-comment token used for the generated-file banner.
    #[serde(default = "default_comment_prefix")]
    pub comment_prefix: String,
}

impl StackConfig {
    /// Look up a built-in stack, falling back to the default preset for an
    /// unrecognised id.
    #[must_use]
    pub fn select(id: &str) -> Self {
        presets::builtin(id).unwrap_or_else(|| {
            tracing::warn!(stack = id, fallback = presets::DEFAULT_STACK, "unknown stack id");
            presets::default_stack()
        })
    }

    /// Load a custom stack from a YAML file and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self, StackError> {
        let raw = fs
            .read_to_string(path)
            .map_err(|e| StackError::Read { path: path.to_path_buf(), message: e.to_string() })?;
        let stack: StackConfig = serde_yaml::from_str(&raw)
            .map_err(|e| StackError::Parse { path: path.to_path_buf(), message: e.to_string() })?;
        stack.validate()?;
        Ok(stack)
    }

    /// Check structural invariants not expressed by the types.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), StackError> {
        if self.id.trim().is_empty() {
            return Err(StackError::Invalid("stack id must not be empty".into()));
        }
        if self.prompt_persona.trim().is_empty() {
            return Err(StackError::Invalid(format!("stack '{}' has no prompt persona", self.id)));
        }
        if self.comment_prefix.trim().is_empty() {
            return Err(StackError::Invalid(format!("stack '{}' has no comment prefix", self.id)));
        }
        self.extensions.validate()
    }

    /// Rewrite the extension of `implementation_path` for `role`.
    ///
    /// A leading `./` is dropped. A path without an extension gets one appended.
    #[must_use]
    pub fn rewrite_extension(&self, implementation_path: &str, role: Role) -> String {
        let trimmed = implementation_path.trim();
        let relative = trimmed.strip_prefix("./").unwrap_or(trimmed);
        let desired = self.extensions.for_role(role);
        let name_start = relative.rfind('/').map_or(0, |i| i + 1);
        match relative[name_start..].rfind('.') {
            Some(dot) if dot > 0 => format!("{}{desired}", &relative[..name_start + dot]),
            _ => format!("{relative}{desired}"),
        }
    }

    /// Target artifact path for an implementation path declared with `role`.
    #[must_use]
    pub fn target_path(&self, output_dir: &Path, implementation_path: &str, role: Role) -> PathBuf {
        output_dir.join(self.rewrite_extension(implementation_path, role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn js_stack() -> StackConfig {
        let mut stack = presets::default_stack();
        stack.extensions = Extensions::new(".js", &[(Role::Presentation, ".jsx")]);
        stack
    }

    #[test]
    fn target_path_uses_role_extension() {
        let stack = js_stack();
        let out = Path::new("/out");
        assert_eq!(
            stack.target_path(out, "foo.tmp", Role::Presentation),
            PathBuf::from("/out/foo.jsx")
        );
        assert_eq!(stack.target_path(out, "foo.tmp", Role::Default), PathBuf::from("/out/foo.js"));
        assert_eq!(stack.target_path(out, "foo.tmp", Role::Backend), PathBuf::from("/out/foo.js"));
    }

    #[test]
    fn rewrite_handles_dot_prefix_and_missing_extension() {
        let stack = js_stack();
        assert_eq!(stack.rewrite_extension("./domain", Role::Domain), "domain.js");
        assert_eq!(stack.rewrite_extension("./ui/board.jsx", Role::Default), "ui/board.js");
        assert_eq!(stack.rewrite_extension("lib.v2/.hidden", Role::Default), "lib.v2/.hidden.js");
    }

    #[test]
    fn distinct_extensions_start_with_default() {
        let ext = Extensions::new(
            ".jsx",
            &[(Role::Presentation, ".jsx"), (Role::BusinessLogic, ".js"), (Role::Domain, ".js")],
        );
        assert_eq!(ext.distinct(), vec![".jsx", ".js"]);
    }

    #[test]
    fn extensions_table_requires_default_and_known_roles() {
        let missing: Result<Extensions, _> =
            serde_yaml::from_str("Presentation: .jsx\n");
        assert!(missing.unwrap_err().to_string().contains("'default'"));

        let unknown: Result<Extensions, _> = serde_yaml::from_str("default: .js\nWidget: .w\n");
        assert!(unknown.unwrap_err().to_string().contains("unknown role 'Widget'"));

        let ok: Extensions = serde_yaml::from_str("default: .js\nBusiness Logic: .ts\n").unwrap();
        assert_eq!(ok.for_role(Role::BusinessLogic), ".ts");
        assert_eq!(ok.for_role(Role::Presentation), ".js");
    }

    #[test]
    fn unknown_stack_id_falls_back_to_default() {
        assert_eq!(StackConfig::select("cobol-mainframe").id, presets::DEFAULT_STACK);
        assert_eq!(StackConfig::select("python-fastapi").id, "python-fastapi");
    }

    #[test]
    fn load_validates_custom_stack() {
        use crate::adapters::live::filesystem::LiveFileSystem;

        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("go.yaml");
        std::fs::write(
            &good,
            "id: go-std\ntechStack: [Go 1.22]\nextensions:\n  default: .go\n\
             promptPersona: Senior Go Developer\nsignatureFormat: Go declarations\n",
        )
        .unwrap();
        let stack = StackConfig::load(&LiveFileSystem, &good).unwrap();
        assert_eq!(stack.id, "go-std");
        assert_eq!(stack.comment_prefix, "//");
        assert!(stack.constraints.is_empty());

        let bad = dir.path().join("bad.yaml");
        std::fs::write(
            &bad,
            "id: bad\ntechStack: []\nextensions:\n  default: go\n\
             promptPersona: x\nsignatureFormat: y\n",
        )
        .unwrap();
        let err = StackConfig::load(&LiveFileSystem, &bad).unwrap_err();
        assert!(matches!(err, StackError::Invalid(_)));

        let missing = StackConfig::load(&LiveFileSystem, &dir.path().join("none.yaml"));
        assert!(matches!(missing, Err(StackError::Read { .. })));
    }
}
