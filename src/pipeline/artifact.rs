//! Rendering of generated files.

use crate::stack::StackConfig;

/// Prefix `code` with the do-not-edit banner for `source_name`.
///
/// The result always ends with exactly one newline.
#[must_use]
pub fn render(stack: &StackConfig, source_name: &str, code: &str) -> String {
    let p = stack.comment_prefix.trim();
    format!(
        "{p} DO NOT EDIT THIS FILE DIRECTLY\n\
         {p} This file was generated by islgen.\n\
         {p} Source: {source_name}\n\
         {p} Edit the specification file instead.\n\n\
         {code}\n",
        code = code.trim_end_matches(['\n', '\r']),
    )
}

/// Sidecar contents for a parsed signature block.
#[must_use]
pub fn render_signature(signature: &str) -> String {
    format!("{}\n", signature.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::presets;

    #[test]
    fn banner_uses_stack_comment_prefix() {
        let js = presets::default_stack();
        let out = render(&js, "board.isl.md", "export default 1;\n\n");
        assert!(out.starts_with("// DO NOT EDIT THIS FILE DIRECTLY\n"));
        assert!(out.contains("// Source: board.isl.md\n"));
        assert!(out.ends_with("\n\nexport default 1;\n"));

        let py = presets::builtin("python-fastapi").unwrap();
        let out = render(&py, "api.isl.md", "x = 1");
        assert!(out.starts_with("# DO NOT EDIT"));
        assert!(out.ends_with("x = 1\n"));
    }
}
