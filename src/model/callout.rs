//! Parsed callout tree types.
//!
//! A [`Callout`] is rebuilt from scratch every time the document is parsed.
//! Nothing in this module is cached across operations: line numbers are only
//! meaningful for the text they were parsed from.

use serde::Serialize;
use std::fmt;

/// Inclusive, 0-based line range `[start, end]` in a document.
///
/// Invariant: `start <= end`. The constructor normalizes swapped bounds
/// instead of failing, since every producer in this crate already
/// guarantees ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LineRange {
    start: usize,
    end: usize,
}

impl LineRange {
    /// Create a range covering `start..=end`.
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// A single-line range.
    pub fn single(line: usize) -> Self {
        Self {
            start: line,
            end: line,
        }
    }

    /// First line of the range.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Last line of the range (inclusive).
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of lines covered.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Always false; a range covers at least one line.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `line` falls inside the range.
    pub fn contains_line(&self, line: usize) -> bool {
        self.start <= line && line <= self.end
    }

    /// Whether `other` lies entirely within this range.
    pub fn contains(&self, other: &LineRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether the two ranges share at least one line.
    pub fn overlaps(&self, other: &LineRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Range moved down by `offset` lines.
    pub fn shifted(&self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A callout parsed from document text.
///
/// Fields are read-only; the tree is only ever re-derived, never edited in
/// place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Callout {
    pub(crate) callout_type: String,
    pub(crate) title: String,
    pub(crate) is_collapsed: bool,
    pub(crate) content: String,
    pub(crate) start_line: usize,
    pub(crate) end_line: usize,
    pub(crate) nested: Vec<Callout>,
    pub(crate) raw_line: String,
}

impl Callout {
    /// Type tag inside `[!...]`, case preserved.
    pub fn callout_type(&self) -> &str {
        &self.callout_type
    }

    /// Trimmed title text following the type marker. May be empty.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Collapse state persisted in text (`-` marker).
    pub fn is_collapsed(&self) -> bool {
        self.is_collapsed
    }

    /// De-quoted body text, header excluded, lines joined with `\n`.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Header line index.
    pub fn start_line(&self) -> usize {
        self.start_line
    }

    /// Last line belonging to this callout, nested callouts included.
    pub fn end_line(&self) -> usize {
        self.end_line
    }

    /// `[start_line, end_line]` as a range.
    pub fn range(&self) -> LineRange {
        LineRange::new(self.start_line, self.end_line)
    }

    /// Direct children in document order.
    pub fn nested_callouts(&self) -> &[Callout] {
        &self.nested
    }

    /// Header line exactly as it appeared in the document.
    pub fn raw_line(&self) -> &str {
        &self.raw_line
    }

    /// Whether `line` is inside this callout's range.
    pub fn contains_line(&self, line: usize) -> bool {
        self.range().contains_line(line)
    }

    /// Re-express line numbers `offset` lines further down, recursively.
    pub(crate) fn shift(&mut self, offset: usize) {
        self.start_line += offset;
        self.end_line += offset;
        for child in &mut self.nested {
            child.shift(offset);
        }
    }

    /// Iterate this callout and all descendants in document (pre-)order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Pre-order iterator over a callout and its nested callouts.
#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<&'a Callout>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Callout;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        // Reverse so the first child is popped first
        self.stack.extend(next.nested.iter().rev());
        Some(next)
    }
}
