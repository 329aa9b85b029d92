//! Header-line rewriting for collapse state changes.
//!
//! Only the collapse marker right after `[!type]` is touched; quote prefix,
//! type tag and title are kept byte for byte. Replacements are always whole
//! header lines, never multi-line ranges, so nested content cannot be
//! disturbed.

use crate::model::Callout;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Any-depth header: quote prefix with type tag, optional marker, rest.
static MUTATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*(?:>\s*)+\[![A-Za-z0-9-]+\])([+-])?(.*)$")
        .expect("mutation pattern is valid")
});

/// Result of asking for a new collapse state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The header line must be replaced with this text.
    Changed(String),
    /// The header already has the requested state, or could not be rewritten.
    NoChange,
}

impl MutationOutcome {
    /// Whether a write is required.
    pub fn is_changed(&self) -> bool {
        matches!(self, MutationOutcome::Changed(_))
    }
}

/// Marker character for a collapse state.
fn marker_for(collapsed: bool) -> &'static str {
    if collapsed {
        "-"
    } else {
        "+"
    }
}

/// Rewrite a header line's collapse marker.
///
/// Returns `None` when the line is not a callout header.
///
/// # Examples
///
/// ```
/// use callout_sync::mutation::rewrite_header;
///
/// assert_eq!(
///     rewrite_header("> [!warning] Untitled", true).as_deref(),
///     Some("> [!warning]- Untitled")
/// );
/// ```
pub fn rewrite_header(line: &str, collapsed: bool) -> Option<String> {
    let caps = MUTATION_PATTERN.captures(line)?;
    let prefix = caps.get(1)?.as_str();
    let rest = caps.get(3).map_or("", |m| m.as_str());
    Some(format!("{prefix}{}{rest}", marker_for(collapsed)))
}

/// Compute the header line for `callout` in state `collapsed`.
///
/// Reports [`MutationOutcome::NoChange`] when the callout already has that
/// state, so batch operations can skip redundant buffer writes. Malformed
/// headers are left alone and also report `NoChange`.
pub fn update_collapse_state(callout: &Callout, collapsed: bool) -> MutationOutcome {
    if callout.is_collapsed() == collapsed {
        return MutationOutcome::NoChange;
    }

    match rewrite_header(callout.raw_line(), collapsed) {
        Some(updated) if updated != callout.raw_line() => MutationOutcome::Changed(updated),
        Some(_) => MutationOutcome::NoChange,
        None => {
            warn!(
                line = callout.start_line(),
                raw = %callout.raw_line(),
                "Header does not match mutation pattern; leaving it untouched"
            );
            MutationOutcome::NoChange
        }
    }
}

/// Whole-line replacement of a single header line.
///
/// Columns count `char`s. `end_col` is the length of the line being replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEdit {
    /// 0-based line to replace.
    pub line: usize,
    /// Always 0.
    pub start_col: usize,
    /// Character length of the old line.
    pub end_col: usize,
    /// Replacement text, without line terminator.
    pub text: String,
}

impl LineEdit {
    /// Edit replacing the header of `callout` with `text`.
    pub fn for_header(callout: &Callout, text: String) -> Self {
        Self {
            line: callout.start_line(),
            start_col: 0,
            end_col: callout.raw_line().chars().count(),
            text,
        }
    }
}

/// Header edits for a set of `(callout, new_collapsed)` decisions.
///
/// Callouts already in their target state produce no edit. The result is
/// sorted by descending line so it can be applied one edit at a time
/// against a line-indexed buffer without invalidating later edits.
pub fn plan_header_edits<'a, I>(decisions: I) -> Vec<LineEdit>
where
    I: IntoIterator<Item = (&'a Callout, bool)>,
{
    let mut edits: Vec<LineEdit> = decisions
        .into_iter()
        .filter_map(|(callout, collapsed)| match update_collapse_state(callout, collapsed) {
            MutationOutcome::Changed(text) => Some(LineEdit::for_header(callout, text)),
            MutationOutcome::NoChange => {
                debug!(line = callout.start_line(), "Header already in target state");
                None
            }
        })
        .collect();

    edits.sort_by(|a, b| b.line.cmp(&a.line));
    edits
}
