//! Callout parser.
//!
//! Pure functions turning document text into an ordered callout tree. A
//! callout is a block quote whose first line carries a `[!type]` tag:
//!
//! ```text
//! > [!note]- Title        <- header: type "note", collapsed, title "Title"
//! > body                  <- continuation
//! > > [!tip] Inner        <- nested callout, one quote level deeper
//! > > inner body
//! ```
//!
//! Extraction works on line slices. Every callout is first extracted with
//! line numbers relative to its own header (which sits at 0), then moved into
//! document coordinates by [`Callout::shift`]. Nested callouts are found by
//! re-scanning the de-quoted content lines of their parent with the same
//! start-line predicate, so the recursion never shares a cursor with the
//! outer scan.

pub mod query;

pub use query::{
    find_at_or_above, find_by_start_line, find_closest, find_containing, flatten,
};

use crate::model::Callout;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, trace};

// Quote marker opening every callout line
const QUOTE_MARKER: char = '>';

// Collapse markers
const COLLAPSED_MARKER: &str = "-";

/// Header of a callout at quote depth 1: `>`, optional whitespace, `[!type]`,
/// an optional `+`/`-`, then the title.
static HEADER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^>\s*\[!([A-Za-z0-9-]+)\]([+-])?(.*)$").expect("header pattern is valid")
});

/// Fields captured from a header line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Header<'a> {
    callout_type: &'a str,
    is_collapsed: bool,
    title: &'a str,
}

fn parse_header(line: &str) -> Option<Header<'_>> {
    let caps = HEADER_PATTERN.captures(line)?;
    let callout_type = caps.get(1)?.as_str();
    let is_collapsed = caps
        .get(2)
        .is_some_and(|m| m.as_str() == COLLAPSED_MARKER);
    let title = caps.get(3).map_or("", |m| m.as_str().trim());

    Some(Header {
        callout_type,
        is_collapsed,
        title,
    })
}

/// Whether `line` opens a callout at the current quote depth.
pub fn is_start_line(line: &str) -> bool {
    HEADER_PATTERN.is_match(line)
}

/// Whether `line` belongs to a block quote at all.
pub fn is_quote_line(line: &str) -> bool {
    line.starts_with(QUOTE_MARKER)
}

/// Remove one quote marker and at most one whitespace character after it.
///
/// Lines without a leading marker are returned unchanged.
pub fn strip_quote(line: &str) -> &str {
    let Some(rest) = line.strip_prefix(QUOTE_MARKER) else {
        return line;
    };
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_whitespace() => chars.as_str(),
        _ => rest,
    }
}

/// Parse a whole document into its top-level callouts, in document order.
///
/// Nested callouts are reachable through [`Callout::nested_callouts`].
/// Parsing the same text twice yields structurally equal trees.
///
/// # Examples
///
/// ```
/// use callout_sync::parser::parse_document;
///
/// let callouts = parse_document("> [!note]- Title\n> body\n");
/// assert_eq!(callouts.len(), 1);
/// assert_eq!(callouts[0].title(), "Title");
/// assert!(callouts[0].is_collapsed());
/// assert_eq!((callouts[0].start_line(), callouts[0].end_line()), (0, 1));
/// ```
pub fn parse_document(text: &str) -> Vec<Callout> {
    let lines: Vec<&str> = text.lines().collect();
    parse_lines(&lines)
}

/// Parse already-split lines. Line numbers in the result index into `lines`.
pub fn parse_lines(lines: &[&str]) -> Vec<Callout> {
    let mut callouts = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if is_start_line(lines[i]) {
            if let Some(mut callout) = extract(&lines[i..], &lines[i..]) {
                callout.shift(i);
                trace!(
                    start = callout.start_line,
                    end = callout.end_line,
                    callout_type = %callout.callout_type,
                    "Parsed callout"
                );
                // Siblings never overlap: resume after this callout
                i = callout.end_line + 1;
                callouts.push(callout);
                continue;
            }
            debug!(line = i, "Skipping unparseable callout header");
        }
        i += 1;
    }

    callouts
}

/// Extract the callout whose header is `lines[0]`.
///
/// `source` is aligned with `lines` and holds the original document lines
/// (`lines` may have had quote levels stripped). Line numbers in the result
/// are relative to `lines[0]`.
fn extract(lines: &[&str], source: &[&str]) -> Option<Callout> {
    let header = parse_header(lines.first()?)?;
    let end = find_end(lines);

    let content_lines: Vec<&str> = lines[1..=end].iter().copied().map(strip_quote).collect();
    let nested = detect_nested(&content_lines, &source[1..=end]);

    Some(Callout {
        callout_type: header.callout_type.to_string(),
        title: header.title.to_string(),
        is_collapsed: header.is_collapsed,
        content: content_lines.join("\n"),
        start_line: 0,
        end_line: end,
        nested,
        raw_line: source[0].to_string(),
    })
}

/// Index of the last line belonging to the callout headed by `lines[0]`.
///
/// Each following line is one of:
/// - a header at the same depth: a sibling, which ends this callout;
/// - a quote line: content, and if it is a deeper header, one more open
///   nested callout;
/// - anything else: a terminator. While nested callouts are open and the
///   next line still continues this callout, the terminator only closes one
///   nested level and is kept as content.
fn find_end(lines: &[&str]) -> usize {
    let mut nesting = 0usize;
    let mut end = 0;

    for (i, line) in lines.iter().enumerate().skip(1) {
        if is_start_line(line) {
            break;
        }
        if is_quote_line(line) {
            if is_start_line(strip_quote(line)) {
                nesting += 1;
            }
            end = i;
            continue;
        }
        if nesting > 0 && continues_callout(lines.get(i + 1).copied()) {
            nesting -= 1;
            end = i;
            continue;
        }
        break;
    }

    end
}

fn continues_callout(next: Option<&str>) -> bool {
    next.is_some_and(|line| is_quote_line(line) && !is_start_line(line))
}

/// Find nested callouts among a parent's de-quoted content lines.
///
/// Results are relative to the parent's header (content line 0 is parent
/// line 1).
fn detect_nested(content: &[&str], source: &[&str]) -> Vec<Callout> {
    let mut nested = Vec::new();
    let mut offset = 0;

    while offset < content.len() {
        if is_start_line(content[offset]) {
            if let Some(mut child) = extract(&content[offset..], &source[offset..]) {
                let span = child.end_line + 1;
                child.shift(1 + offset);
                nested.push(child);
                // Skip the whole child so its own lines are not re-detected
                offset += span;
                continue;
            }
        }
        offset += 1;
    }

    nested
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
