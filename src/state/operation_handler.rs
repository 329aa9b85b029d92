//! Callout collapse/expand operation handler.
//!
//! Applies an [`OperationRequest`] to the active document: pick the target
//! callouts for the scope, decide each one's new state under the mode, then
//! write the decisions back to the text and the rendered view.
//!
//! Every call starts from fresh host snapshots and a fresh parse; nothing is
//! remembered between operations.

use crate::correlate::{tag_positions, Correlation};
use crate::host::{visual_patching_enabled, Editor, MemorySurface, VisualElement, VisualSurface};
use crate::model::error::HostError;
use crate::model::{Callout, Mode, OperationRequest, Scope};
use crate::mutation::plan_header_edits;
use crate::parser;
use crate::section::SectionResolver;
use tracing::{debug, error, info};

/// Tunables for the operation handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Heading detection for [`Scope::Section`].
    pub resolver: SectionResolver,
    /// Record source line ranges on rendered elements after correlating.
    pub tag_positions: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            resolver: SectionResolver::default(),
            tag_positions: true,
        }
    }
}

/// What an operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationReport {
    /// Scope that was applied.
    pub scope: Scope,
    /// Mode that was applied.
    pub mode: Mode,
    /// Callouts selected by the scope.
    pub targets: usize,
    /// Header lines rewritten.
    pub text_edits: usize,
    /// Targets whose header already had the requested state.
    pub unchanged: usize,
    /// Rendered elements whose state actually changed.
    pub visual_patches: usize,
    /// Rendered elements with no matching callout.
    pub unmatched_elements: usize,
    /// Rendered elements that received a new position tag.
    pub tagged: usize,
}

impl OperationReport {
    fn new(request: &OperationRequest) -> Self {
        Self {
            scope: request.scope,
            mode: request.mode,
            targets: 0,
            text_edits: 0,
            unchanged: 0,
            visual_patches: 0,
            unmatched_elements: 0,
            tagged: 0,
        }
    }
}

/// Callouts targeted by `scope` around `reference_line`.
///
/// - `Current`: innermost callout containing the line, else the nearest
///   callout whose header is at or above it, else nothing.
/// - `Section`: top-level callouts fully inside the line's section.
/// - `All`: every top-level callout.
pub fn select_targets<'c>(
    scope: Scope,
    callouts: &'c [Callout],
    lines: &[&str],
    reference_line: usize,
    resolver: &SectionResolver,
) -> Vec<&'c Callout> {
    match scope {
        Scope::Current => parser::find_containing(callouts, reference_line)
            .or_else(|| parser::find_at_or_above(callouts, reference_line))
            .into_iter()
            .collect(),
        Scope::Section => resolver.callouts_in_section(lines, callouts, reference_line),
        Scope::All => callouts.iter().collect(),
    }
}

/// Pair each target with its new collapsed state under `mode`.
pub fn decide<'c>(mode: Mode, targets: &[&'c Callout]) -> Vec<(&'c Callout, bool)> {
    let current: Vec<bool> = targets.iter().map(|c| c.is_collapsed()).collect();
    targets
        .iter()
        .copied()
        .zip(mode.assign(&current))
        .collect()
}

/// Run `request` against the host.
///
/// All host snapshots (text, cursor, rendered elements) are taken before the
/// first write, so an unreachable editor or view aborts without side
/// effects. Header edits are applied in descending line order. An empty
/// target set is a no-op, not an error.
///
/// # Errors
///
/// Returns the first [`HostError`] raised by the editor or the surface.
pub fn operate<E, S>(
    editor: &mut E,
    surface: Option<&mut S>,
    request: OperationRequest,
    options: &EngineOptions,
) -> Result<OperationReport, HostError>
where
    E: Editor,
    S: VisualSurface,
{
    let text = editor.text()?;
    let reference_line = editor.cursor_line()?;
    let visual = visual_patching_enabled(editor.view_mode(), surface.is_some());
    let elements = match surface {
        Some(surface) if visual => Some(surface.elements_mut()?),
        _ => None,
    };

    let lines: Vec<&str> = text.lines().collect();
    let callouts = parser::parse_lines(&lines);
    let targets = select_targets(
        request.scope,
        &callouts,
        &lines,
        reference_line,
        &options.resolver,
    );
    let decisions = decide(request.mode, &targets);

    let mut report = OperationReport::new(&request);
    report.targets = decisions.len();
    if decisions.is_empty() {
        debug!(scope = %request.scope, line = reference_line, "No callouts in scope");
    }

    if request.write_text {
        let edits = plan_header_edits(decisions.iter().copied());
        report.unchanged = decisions.len() - edits.len();
        for edit in &edits {
            debug!(line = edit.line, text = %edit.text, "Rewriting callout header");
            editor.replace_line_range(edit)?;
            report.text_edits += 1;
        }
    }

    if let Some(elements) = elements {
        patch_elements(elements, &callouts, &decisions, &request, options, &mut report);
    }

    Ok(report)
}

/// Text-only variant of [`operate`] for hosts without a rendered view.
///
/// # Errors
///
/// Returns the first [`HostError`] raised by the editor.
pub fn operate_text_only<E: Editor>(
    editor: &mut E,
    request: OperationRequest,
    options: &EngineOptions,
) -> Result<OperationReport, HostError> {
    operate::<E, MemorySurface>(editor, None, request, options)
}

fn patch_elements<El: VisualElement>(
    elements: &mut [El],
    callouts: &[Callout],
    decisions: &[(&Callout, bool)],
    request: &OperationRequest,
    options: &EngineOptions,
    report: &mut OperationReport,
) {
    let correlation = Correlation::build(elements, callouts);
    if options.tag_positions {
        report.tagged = tag_positions(elements, correlation.pairs());
    }

    for (callout, collapsed) in decisions {
        let Some(pair) = correlation.pair_for(callout) else {
            debug!(range = %callout.range(), "Target has no rendered element");
            continue;
        };
        report.visual_patches += apply_state(&mut elements[pair.element], *collapsed);
    }

    let unmatched = correlation.unmatched_elements();
    report.unmatched_elements = unmatched.len();

    // Without a callout there is no way to tell whether a narrower scope
    // covers the element, so only ALL patches unmatched elements
    if request.scope != Scope::All || unmatched.is_empty() {
        return;
    }
    let current: Vec<bool> = unmatched.iter().map(|&i| elements[i].is_collapsed()).collect();
    let states = match (request.mode, decisions.first()) {
        // Keep the uniform toggle uniform across text and view
        (Mode::Toggle, Some((_, target))) => vec![*target; unmatched.len()],
        (mode, _) => mode.assign(&current),
    };
    for (&i, collapsed) in unmatched.iter().zip(states) {
        report.visual_patches += apply_state(&mut elements[i], collapsed);
    }
}

/// Apply `collapsed` to `element`, returning 1 if it changed.
fn apply_state<El: VisualElement>(element: &mut El, collapsed: bool) -> usize {
    if element.is_collapsed() == collapsed {
        return 0;
    }
    element.apply_state(collapsed);
    1
}

/// Run `request`, converting host failures into a user notice.
///
/// This is the entry point for command bindings: failures are logged and
/// shown to the user, never propagated.
pub fn run_operation<E, S>(
    editor: &mut E,
    surface: Option<&mut S>,
    request: OperationRequest,
    options: &EngineOptions,
) -> Option<OperationReport>
where
    E: Editor,
    S: VisualSurface,
{
    match operate(editor, surface, request, options) {
        Ok(report) => {
            info!(
                scope = %report.scope,
                mode = %report.mode,
                targets = report.targets,
                text_edits = report.text_edits,
                visual_patches = report.visual_patches,
                "Callout operation finished"
            );
            Some(report)
        }
        Err(err) => {
            error!(error = %err, scope = %request.scope, mode = %request.mode, "Callout operation failed");
            editor.notify(&format!("Could not {} callouts: {err}", request.mode));
            None
        }
    }
}

// ===== Tests =====

#[cfg(test)]
#[path = "operation_handler_tests.rs"]
mod tests;
