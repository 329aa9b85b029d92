//! Heading-bounded sections.
//!
//! A section runs from a heading line (inclusive) down to the line before the
//! next heading, or to a document boundary.

use crate::model::{Callout, LineRange};

/// Default heading marker.
pub const DEFAULT_HEADING_MARKER: char = '#';

// ATX headings allow at most six markers
const MAX_HEADING_LEVEL: usize = 6;

/// Decides which lines are headings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionResolver {
    marker: char,
}

impl Default for SectionResolver {
    fn default() -> Self {
        Self::new(DEFAULT_HEADING_MARKER)
    }
}

impl SectionResolver {
    /// Resolver using `marker` as the heading marker.
    pub fn new(marker: char) -> Self {
        Self { marker }
    }

    /// The configured heading marker.
    pub fn marker(&self) -> char {
        self.marker
    }

    /// Whether `line` is a heading: 1 to 6 markers followed by whitespace or
    /// end of line.
    pub fn is_heading(&self, line: &str) -> bool {
        let level = line.chars().take_while(|c| *c == self.marker).count();
        if level == 0 || level > MAX_HEADING_LEVEL {
            return false;
        }
        // Markers are single chars; skip them by char count
        line.chars()
            .nth(level)
            .is_none_or(char::is_whitespace)
    }

    /// Inclusive section around `reference_line`.
    ///
    /// Returns `None` only for an empty document. A reference line past the
    /// end is clamped to the last line.
    pub fn resolve_section(&self, lines: &[&str], reference_line: usize) -> Option<LineRange> {
        let last = lines.len().checked_sub(1)?;
        let reference = reference_line.min(last);

        let start = (0..=reference)
            .rev()
            .find(|&i| self.is_heading(lines[i]))
            .unwrap_or(0);

        let end = (reference + 1..lines.len())
            .find(|&i| self.is_heading(lines[i]))
            .map_or(last, |next_heading| next_heading - 1);

        Some(LineRange::new(start, end))
    }

    /// Top-level callouts lying entirely inside the section around
    /// `reference_line`.
    pub fn callouts_in_section<'c>(
        &self,
        lines: &[&str],
        callouts: &'c [Callout],
        reference_line: usize,
    ) -> Vec<&'c Callout> {
        match self.resolve_section(lines, reference_line) {
            Some(section) => filter_contained(callouts, section),
            None => Vec::new(),
        }
    }
}

/// Callouts whose whole range is inside `section`; partial overlaps are
/// excluded.
pub fn filter_contained(callouts: &[Callout], section: LineRange) -> Vec<&Callout> {
    callouts
        .iter()
        .filter(|c| section.contains(&c.range()))
        .collect()
}
