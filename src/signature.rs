//! Signature collector: real contracts of already-generated dependencies.
//!
//! Each generated artifact may leave a signature sidecar next to it. When a
//! later entry declares that artifact as a dependency, the sidecar's text is
//! handed to the oracle verbatim so the dependent codes against what was
//! actually generated rather than what the documentation promised.

use std::path::{Path, PathBuf};

use crate::build_context::BuildContext;
use crate::ports::FileSystem;
use crate::stack::{Role, StackConfig};

/// Suffix appended to a target path to form its signature sidecar path.
pub const SIGNATURE_SUFFIX: &str = ".sign.ts";

/// The public contract of one already-generated dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureEntry {
    /// Implementation path exactly as the dependency section declared it.
    pub path: String,
    /// Sidecar contents, verbatim.
    pub signature: String,
}

/// Sidecar path for an artifact written at `target`.
#[must_use]
pub fn sidecar_path(target: &Path) -> PathBuf {
    let mut raw = target.as_os_str().to_os_string();
    raw.push(SIGNATURE_SUFFIX);
    PathBuf::from(raw)
}

/// Candidate sidecar locations for a dependency, most specific first.
fn candidates(stack: &StackConfig, output_dir: &Path, declared: &str, role: Role) -> Vec<PathBuf> {
    let relative = declared.strip_prefix("./").unwrap_or(declared);
    let base = output_dir.join(relative);

    let mut out = vec![
        sidecar_path(&stack.target_path(output_dir, declared, role)),
        sidecar_path(&base),
    ];
    for ext in stack.extensions.distinct() {
        let mut raw = base.as_os_str().to_os_string();
        raw.push(ext);
        out.push(sidecar_path(Path::new(&raw)));
    }
    let mut seen = Vec::with_capacity(out.len());
    out.retain(|p| {
        if seen.contains(p) {
            false
        } else {
            seen.push(p.clone());
            true
        }
    });
    out
}

/// Collect the signatures of every dependency declared in `build_context`
/// whose sidecar exists under `output_dir`.
///
/// Dependencies without a declared implementation path or without a sidecar
/// are omitted. The result follows declaration order with one entry per path.
#[must_use]
pub fn collect(
    fs: &dyn FileSystem,
    build_context: &str,
    stack: &StackConfig,
    output_dir: &Path,
) -> Vec<SignatureEntry> {
    let context = BuildContext::parse(build_context);
    let mut out: Vec<SignatureEntry> = Vec::new();
    let mut visited: Vec<&str> = Vec::new();

    for dep in &context.dependencies {
        let Some(declared) = dep.implementation_path else {
            continue;
        };
        let key = declared.strip_prefix("./").unwrap_or(declared);
        if visited.contains(&key) {
            continue;
        }
        visited.push(key);

        let Some(found) = candidates(stack, output_dir, declared, dep.role)
            .into_iter()
            .find(|p| fs.exists(p))
        else {
            tracing::debug!(dependency = declared, "no signature sidecar yet");
            continue;
        };
        match fs.read_to_string(&found) {
            Ok(signature) => out.push(SignatureEntry { path: declared.to_string(), signature }),
            Err(e) => {
                tracing::warn!(
                    dependency = declared,
                    sidecar = %found.display(),
                    error = %e,
                    "failed to read signature"
                );
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::presets;
    use crate::testing::MemFs;

    fn context(deps: &[(&str, &str)]) -> String {
        let mut out = String::new();
        for (path, role) in deps {
            out.push_str(&format!(
                "<!-- START DEPENDENCY INTERFACE: x.ref.md -->\n\
                 <!-- IMPLEMENTATION PATH: {path} -->\n\
                 **Role**: {role}\n\
                 <!-- END DEPENDENCY INTERFACE -->\n"
            ));
        }
        out.push_str("<!-- SOURCE FILE TO IMPLEMENT -->\n**Role**: Presentation\n");
        out
    }

    #[test]
    fn sidecar_appends_suffix() {
        assert_eq!(sidecar_path(Path::new("/out/a.jsx")), PathBuf::from("/out/a.jsx.sign.ts"));
    }

    #[test]
    fn resolves_role_extension_first() {
        let fs = MemFs::with(&[
            ("/out/store.js.sign.ts", "export function store(): Store"),
            ("/out/store.jsx.sign.ts", "stale"),
        ]);
        let stack = presets::default_stack();
        let ctx = context(&[("./store", "Business Logic")]);
        let found = collect(&fs, &ctx, &stack, Path::new("/out"));
        assert_eq!(
            found,
            vec![SignatureEntry {
                path: "./store".into(),
                signature: "export function store(): Store".into()
            }]
        );
    }

    #[test]
    fn falls_back_to_declared_path_and_extensions() {
        let fs = MemFs::with(&[("/out/ui/button.jsx.sign.ts", "export default Button")]);
        let stack = presets::default_stack();
        // Declared as Domain (.js) but only a .jsx sidecar exists.
        let found = collect(&fs, &context(&[("ui/button", "Domain")]), &stack, Path::new("/out"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].signature, "export default Button");

        let fs = MemFs::with(&[("/out/lib/util.mjs.sign.ts", "export const x = 1")]);
        let found = collect(&fs, &context(&[("lib/util.mjs", "Model")]), &stack, Path::new("/out"));
        assert_eq!(found[0].path, "lib/util.mjs");
    }

    #[test]
    fn missing_sidecars_and_duplicates_are_omitted() {
        let fs = MemFs::with(&[("/out/a.js.sign.ts", "A")]);
        let stack = presets::default_stack();
        let ctx = context(&[("./a", "Domain"), ("./b", "Domain"), ("a", "Domain")]);
        let found = collect(&fs, &ctx, &stack, Path::new("/out"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "./a");
    }

    #[test]
    fn dependency_without_implementation_path_is_skipped() {
        let fs = MemFs::with(&[("/out/a.js.sign.ts", "A")]);
        let ctx = "<!-- START DEPENDENCY INTERFACE: a.ref.md -->\n\
                   <!-- END DEPENDENCY INTERFACE -->\n\
                   <!-- SOURCE FILE TO IMPLEMENT -->\n";
        assert!(collect(&fs, ctx, &presets::default_stack(), Path::new("/out")).is_empty());
    }
}
