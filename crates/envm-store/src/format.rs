//! Rendering a variable set as shell `export` statements.
//!
//! The output of [`export_script`] is meant to be passed to `eval`, so
//! values are always double-quoted with the characters the shell would
//! still interpret inside double quotes escaped.

use crate::types::VariableSet;

/// `export NAME="value"` for a single variable.
pub fn export_line(name: &str, value: &str) -> String {
    format!("export {name}={}", quote(value))
}

/// One `export` line per variable, sorted by name, joined with `\n`.
///
/// No trailing newline is added. An empty set renders as the empty string.
pub fn export_script(variables: &VariableSet) -> String {
    variables
        .iter()
        .map(|(name, value)| export_line(name, value))
        .collect::<Vec<_>>()
        .join("\n")
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        if matches!(ch, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}
