//! Human-readable and JSON renderings of a parsed callout tree.

use crate::model::Callout;
use std::fmt::Write as _;

/// Indented text outline, one callout per line, 1-based line numbers.
///
/// ```
/// use callout_sync::outline::render_outline;
/// use callout_sync::parser::parse_document;
///
/// let callouts = parse_document("> [!note]- Title\n> body");
/// assert_eq!(render_outline(&callouts), "1-2 [!note]- Title\n");
/// ```
pub fn render_outline(callouts: &[Callout]) -> String {
    let mut out = String::new();
    for callout in callouts {
        write_entry(&mut out, callout, 0);
    }
    out
}

fn write_entry(out: &mut String, callout: &Callout, depth: usize) {
    let marker = if callout.is_collapsed() { '-' } else { '+' };
    // Writing to a String cannot fail
    let _ = write!(
        out,
        "{:indent$}{}-{} [!{}]{marker}",
        "",
        callout.start_line() + 1,
        callout.end_line() + 1,
        callout.callout_type(),
        indent = depth * 2,
    );
    if !callout.title().is_empty() {
        out.push(' ');
        out.push_str(callout.title());
    }
    out.push('\n');

    for child in callout.nested_callouts() {
        write_entry(out, child, depth + 1);
    }
}

/// The callout tree as pretty-printed JSON.
///
/// # Errors
///
/// Propagates serializer failures.
pub fn render_json(callouts: &[Callout]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(callouts)
}
