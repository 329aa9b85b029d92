//! Line-based lookups over a parsed callout tree.
//!
//! All queries walk the tree in document order and return borrowed callouts;
//! "not found" is `None`.

use crate::model::Callout;

/// Every callout, nested ones included, in document (pre-)order.
pub fn flatten(callouts: &[Callout]) -> Vec<&Callout> {
    callouts.iter().flat_map(Callout::descendants).collect()
}

/// The callout whose header is exactly `line`.
pub fn find_by_start_line(callouts: &[Callout], line: usize) -> Option<&Callout> {
    callouts
        .iter()
        .flat_map(Callout::descendants)
        .find(|c| c.start_line() == line)
}

/// The innermost callout whose range contains `line`.
pub fn find_containing(callouts: &[Callout], line: usize) -> Option<&Callout> {
    let mut level = callouts;
    let mut found = None;

    // Siblings are disjoint, so at most one callout per level contains the line
    while let Some(hit) = level.iter().find(|c| c.contains_line(line)) {
        found = Some(hit);
        level = hit.nested_callouts();
    }

    found
}

/// The callout with the greatest header line that is `<= line`.
pub fn find_at_or_above(callouts: &[Callout], line: usize) -> Option<&Callout> {
    callouts
        .iter()
        .flat_map(Callout::descendants)
        .filter(|c| c.start_line() <= line)
        .max_by_key(|c| c.start_line())
}

/// The callout whose header is nearest to `line`; ties go to the one found
/// first in document order.
pub fn find_closest(callouts: &[Callout], line: usize) -> Option<&Callout> {
    let mut best: Option<(&Callout, usize)> = None;

    for callout in callouts.iter().flat_map(Callout::descendants) {
        let distance = callout.start_line().abs_diff(line);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((callout, distance));
        }
    }

    best.map(|(callout, _)| callout)
}
