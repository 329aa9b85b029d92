//! Matching rendered elements to parsed callouts.
//!
//! Rendered elements carry no line numbers, so the mapping is inferred on
//! every operation from two fresh snapshots. Each element is matched by:
//!
//! 1. its position tag, when an earlier correlation recorded one and a
//!    callout of the same type still occupies exactly that range;
//! 2. otherwise the first unclaimed callout, in document order, matching
//!    title + type + collapsed state, then title + type, then title alone,
//!    then either title containing the other. Each rule is tried for every
//!    remaining element before the next, looser rule is.
//!
//! Each callout is claimed at most once, so duplicated callouts resolve to
//! elements in document order instead of all collapsing onto the first one.

use crate::host::VisualElement;
use crate::model::Callout;
use crate::parser;
use crate::section::SectionResolver;
use tracing::{debug, warn};

/// How an element was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMethod {
    /// Position tag from a previous correlation.
    Position,
    /// Title, type and collapsed state all equal.
    Exact,
    /// Title and type equal.
    TitleAndType,
    /// Title equal.
    Title,
    /// One title contains the other.
    Fuzzy,
    /// No callout found.
    Unmatched,
}

/// One rendered element and the callout it was matched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelatedPair<'c> {
    /// Index into the element snapshot the correlation was built from.
    pub element: usize,
    /// Matched callout, if any.
    pub callout: Option<&'c Callout>,
    /// Which rule produced the match.
    pub method: MatchMethod,
}

impl CorrelatedPair<'_> {
    /// Whether a callout was found.
    pub fn is_matched(&self) -> bool {
        self.callout.is_some()
    }
}

/// Match every element in `elements` to at most one callout in `callouts`
/// (nested callouts included). One pair per element, in element order.
pub fn correlate<'c, E: VisualElement>(
    elements: &[E],
    callouts: &'c [Callout],
) -> Vec<CorrelatedPair<'c>> {
    let candidates = parser::flatten(callouts);
    let mut claimed = vec![false; candidates.len()];
    let mut pairs: Vec<CorrelatedPair<'c>> = (0..elements.len())
        .map(|element| CorrelatedPair {
            element,
            callout: None,
            method: MatchMethod::Unmatched,
        })
        .collect();

    // Tagged elements first, so the cascade cannot steal their callouts
    for (pair, element) in pairs.iter_mut().zip(elements) {
        let Some(range) = element.position() else {
            continue;
        };
        let hit = (0..candidates.len()).find(|&i| {
            !claimed[i]
                && candidates[i].range() == range
                && candidates[i].callout_type() == element.callout_type()
        });
        match hit {
            Some(i) => {
                claimed[i] = true;
                pair.callout = Some(candidates[i]);
                pair.method = MatchMethod::Position;
            }
            None => debug!(%range, "Stale position tag; falling back to matching"),
        }
    }

    // One rule level at a time across all elements, so a loose match for an
    // early element cannot claim a callout a later element matches exactly
    for method in CASCADE {
        for (pair, element) in pairs.iter_mut().zip(elements) {
            if pair.callout.is_some() {
                continue;
            }
            let hit = (0..candidates.len())
                .find(|&i| !claimed[i] && rule_matches(method, element, candidates[i]));
            if let Some(i) = hit {
                claimed[i] = true;
                pair.callout = Some(candidates[i]);
                pair.method = method;
            }
        }
    }

    for (pair, element) in pairs.iter().zip(elements) {
        if !pair.is_matched() {
            warn!(
                title = element.title(),
                callout_type = element.callout_type(),
                "No callout matches rendered element"
            );
        }
    }

    pairs
}

/// Fallback rules, strictest first.
const CASCADE: [MatchMethod; 4] = [
    MatchMethod::Exact,
    MatchMethod::TitleAndType,
    MatchMethod::Title,
    MatchMethod::Fuzzy,
];

fn rule_matches<E: VisualElement>(method: MatchMethod, element: &E, callout: &Callout) -> bool {
    let same_title = callout.title() == element.title();
    let same_type = callout.callout_type() == element.callout_type();
    match method {
        MatchMethod::Exact => {
            same_title && same_type && callout.is_collapsed() == element.is_collapsed()
        }
        MatchMethod::TitleAndType => same_title && same_type,
        MatchMethod::Title => same_title,
        MatchMethod::Fuzzy => titles_overlap(callout.title(), element.title()),
        MatchMethod::Position | MatchMethod::Unmatched => false,
    }
}

/// Title text with inline emphasis markers removed and whitespace collapsed,
/// so a source title compares equal to its rendered text.
fn plain_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '`' | '~'))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Either plain title contains the other. Empty titles never match fuzzily.
fn titles_overlap(a: &str, b: &str) -> bool {
    let (a, b) = (plain_title(a), plain_title(b));
    !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a))
}

/// Record each matched callout's line range on its element, so later
/// correlations can match by position. Fuzzy matches are not tagged: a
/// guess must not become a permanent identity. Returns the number of tags
/// written.
pub fn tag_positions<E: VisualElement>(elements: &mut [E], pairs: &[CorrelatedPair<'_>]) -> usize {
    let mut tagged = 0;
    for pair in pairs {
        if pair.method == MatchMethod::Fuzzy {
            continue;
        }
        let (Some(callout), Some(element)) = (pair.callout, elements.get_mut(pair.element)) else {
            continue;
        };
        if element.position() != Some(callout.range()) {
            element.set_position(callout.range());
            tagged += 1;
        }
    }
    tagged
}

/// A correlation together with the callout tree it was built from.
#[derive(Debug, Clone)]
pub struct Correlation<'c> {
    callouts: &'c [Callout],
    pairs: Vec<CorrelatedPair<'c>>,
}

impl<'c> Correlation<'c> {
    /// Correlate `elements` against `callouts`.
    pub fn build<E: VisualElement>(elements: &[E], callouts: &'c [Callout]) -> Self {
        Self {
            callouts,
            pairs: correlate(elements, callouts),
        }
    }

    /// One pair per element, in element order.
    pub fn pairs(&self) -> &[CorrelatedPair<'c>] {
        &self.pairs
    }

    /// Indices of elements with no matching callout.
    pub fn unmatched_elements(&self) -> Vec<usize> {
        self.pairs
            .iter()
            .filter(|p| !p.is_matched())
            .map(|p| p.element)
            .collect()
    }

    /// The pair matched to `callout`, compared by line range.
    pub fn pair_for(&self, callout: &Callout) -> Option<&CorrelatedPair<'c>> {
        let range = callout.range();
        self.pairs
            .iter()
            .find(|p| p.callout.is_some_and(|c| c.range() == range))
    }

    /// The pair whose callout header is exactly `line`.
    pub fn find_by_line(&self, line: usize) -> Option<&CorrelatedPair<'c>> {
        self.pairs
            .iter()
            .find(|p| p.callout.is_some_and(|c| c.start_line() == line))
    }

    /// The pair for the innermost callout containing `line`.
    pub fn find_containing_line(&self, line: usize) -> Option<&CorrelatedPair<'c>> {
        parser::find_containing(self.callouts, line).and_then(|c| self.pair_for(c))
    }

    /// The pair for the callout whose header is nearest to `line`.
    pub fn find_closest_to_line(&self, line: usize) -> Option<&CorrelatedPair<'c>> {
        parser::find_closest(self.callouts, line).and_then(|c| self.pair_for(c))
    }

    /// Pairs whose callout lies entirely in the section around `line`.
    pub fn all_in_section(
        &self,
        resolver: &SectionResolver,
        lines: &[&str],
        line: usize,
    ) -> Vec<&CorrelatedPair<'c>> {
        let Some(section) = resolver.resolve_section(lines, line) else {
            return Vec::new();
        };
        self.pairs
            .iter()
            .filter(|p| p.callout.is_some_and(|c| section.contains(&c.range())))
            .collect()
    }
}

#[cfg(test)]
#[path = "correlate_tests.rs"]
mod tests;
