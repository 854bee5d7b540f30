//! `islgen stacks` command.

use std::collections::BTreeMap;

use crate::stack::{presets, StackConfig};

/// Execute the `stacks` command.
///
/// # Errors
///
/// Never fails; the signature matches the other handlers.
pub fn run() -> Result<(), String> {
    for id in presets::ids() {
        if let Some(stack) = presets::builtin(id) {
            print!("{}", render(&stack));
        }
    }
    Ok(())
}

fn render(stack: &StackConfig) -> String {
    let default_marker = if stack.id == presets::DEFAULT_STACK { " (default)" } else { "" };
    let mut out = format!("{}{default_marker}\n  tech: {}\n", stack.id, stack.tech_stack.join(", "));
    let extensions: BTreeMap<String, String> = stack.extensions.clone().into();
    for (role, ext) in extensions {
        out.push_str(&format!("  {role}: {ext}\n"));
    }
    out
}
