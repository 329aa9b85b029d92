//! Tests for the callout operation handler.
//!
//! Covers target selection per scope, state decisions per mode, text
//! rewriting order, rendered-view patching and host failure handling.

use super::*;
use crate::host::{MemoryEditor, MemoryElement, MemorySurface, ViewMode};
use crate::model::LineRange;

const DOC: &str = "\
# Alpha
> [!note] One
> body
> > [!tip]- Nested
> > nested body

> [!warning]- Two
> two body
# Beta
> [!info] Three
> three body";

fn request(scope: Scope, mode: Mode) -> OperationRequest {
    OperationRequest::new(scope, mode)
}

fn preview(text: &str, cursor: usize) -> (MemoryEditor, MemorySurface) {
    let editor = MemoryEditor::new(text)
        .with_cursor(cursor)
        .with_view_mode(ViewMode::Preview);
    (editor, MemorySurface::render(text))
}

fn headers(text: &str) -> Vec<String> {
    parser::flatten(&parser::parse_document(text))
        .into_iter()
        .map(|c| c.raw_line().to_string())
        .collect()
}

// ===== select_targets =====

#[test]
fn current_picks_innermost_containing_callout() {
    let callouts = parser::parse_document(DOC);
    let lines: Vec<&str> = DOC.lines().collect();

    let targets = select_targets(Scope::Current, &callouts, &lines, 4, &SectionResolver::default());

    let titles: Vec<&str> = targets.iter().map(|c| c.title()).collect();
    assert_eq!(titles, vec!["Nested"]);
}

#[test]
fn current_falls_back_to_callout_above() {
    let callouts = parser::parse_document(DOC);
    let lines: Vec<&str> = DOC.lines().collect();

    // Line 5 is the blank line between One and Two
    let targets = select_targets(Scope::Current, &callouts, &lines, 5, &SectionResolver::default());

    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].title(), "Nested");
}

#[test]
fn current_before_any_callout_selects_nothing() {
    let callouts = parser::parse_document(DOC);
    let lines: Vec<&str> = DOC.lines().collect();

    let targets = select_targets(Scope::Current, &callouts, &lines, 0, &SectionResolver::default());

    assert!(targets.is_empty());
}

#[test]
fn section_selects_top_level_callouts_under_heading() {
    let callouts = parser::parse_document(DOC);
    let lines: Vec<&str> = DOC.lines().collect();

    let targets = select_targets(Scope::Section, &callouts, &lines, 2, &SectionResolver::default());

    let titles: Vec<&str> = targets.iter().map(|c| c.title()).collect();
    assert_eq!(titles, vec!["One", "Two"]);
}

#[test]
fn all_selects_every_top_level_callout() {
    let callouts = parser::parse_document(DOC);
    let lines: Vec<&str> = DOC.lines().collect();

    let targets = select_targets(Scope::All, &callouts, &lines, 0, &SectionResolver::default());

    let titles: Vec<&str> = targets.iter().map(|c| c.title()).collect();
    assert_eq!(titles, vec!["One", "Two", "Three"]);
}

// ===== operate: text =====

#[test]
fn collapse_all_rewrites_headers_bottom_up() {
    let mut editor = MemoryEditor::new(DOC);

    let report = operate_text_only(
        &mut editor,
        request(Scope::All, Mode::Collapse),
        &EngineOptions::default(),
    )
    .unwrap();

    assert_eq!(report.targets, 3);
    assert_eq!(report.text_edits, 2);
    assert_eq!(report.unchanged, 1, "Two is already collapsed");

    let lines: Vec<usize> = editor.applied_edits().iter().map(|e| e.line).collect();
    assert_eq!(lines, vec![9, 1]);

    let text = editor.contents();
    assert!(text.contains("> [!note]- One"));
    assert!(text.contains("> [!info]- Three"));
    // Nested header is not a top-level target
    assert!(text.contains("> > [!tip]- Nested"));
}

#[test]
fn expand_current_touches_only_that_header() {
    let mut editor = MemoryEditor::new(DOC).with_cursor(7);

    let report = operate_text_only(
        &mut editor,
        request(Scope::Current, Mode::Expand),
        &EngineOptions::default(),
    )
    .unwrap();

    assert_eq!(report.text_edits, 1);
    let text = editor.contents();
    assert!(text.contains("> [!warning]+ Two"));
    assert!(text.contains("> [!note] One"));
    assert!(text.contains("> > [!tip]- Nested"));
}

#[test]
fn expand_current_on_nested_callout_rewrites_nested_header() {
    let mut editor = MemoryEditor::new(DOC).with_cursor(4);

    operate_text_only(
        &mut editor,
        request(Scope::Current, Mode::Expand),
        &EngineOptions::default(),
    )
    .unwrap();

    let text = editor.contents();
    assert!(text.contains("> > [!tip]+ Nested"));
    assert!(text.contains("> [!note] One"));
}

#[test]
fn toggle_majority_expanded_collapses_all() {
    // One collapsed, two expanded: collapsed is the minority
    let mut editor = MemoryEditor::new(DOC);

    operate_text_only(
        &mut editor,
        request(Scope::All, Mode::Toggle),
        &EngineOptions::default(),
    )
    .unwrap();

    let top: Vec<bool> = parser::parse_document(&editor.contents())
        .iter()
        .map(Callout::is_collapsed)
        .collect();
    assert_eq!(top, vec![true, true, true]);
}

#[test]
fn toggle_individual_flips_each_section_target() {
    let mut editor = MemoryEditor::new(DOC).with_cursor(1);

    operate_text_only(
        &mut editor,
        request(Scope::Section, Mode::ToggleIndividual),
        &EngineOptions::default(),
    )
    .unwrap();

    let text = editor.contents();
    assert!(text.contains("> [!note]- One"));
    assert!(text.contains("> [!warning]+ Two"));
    assert!(text.contains("> [!info] Three"), "other section untouched");
}

#[test]
fn toggle_individual_twice_restores_marked_headers() {
    let text = "> [!a]+ A\n\n> [!b]- B";
    let mut editor = MemoryEditor::new(text);
    let options = EngineOptions::default();

    for _ in 0..2 {
        operate_text_only(&mut editor, request(Scope::All, Mode::ToggleIndividual), &options)
            .unwrap();
    }

    assert_eq!(editor.contents(), text);
}

#[test]
fn empty_target_set_is_a_no_op() {
    let text = "# Only prose\nno callouts here";
    let mut editor = MemoryEditor::new(text).with_cursor(1);

    let report = operate_text_only(
        &mut editor,
        request(Scope::Section, Mode::Collapse),
        &EngineOptions::default(),
    )
    .unwrap();

    assert_eq!(report.targets, 0);
    assert_eq!(report.text_edits, 0);
    assert!(editor.applied_edits().is_empty());
    assert!(editor.notices().is_empty());
    assert_eq!(editor.contents(), text);
}

#[test]
fn write_text_false_leaves_text_alone() {
    let (mut editor, mut surface) = preview(DOC, 0);

    let report = operate(
        &mut editor,
        Some(&mut surface),
        request(Scope::All, Mode::Collapse).with_write_text(false),
        &EngineOptions::default(),
    )
    .unwrap();

    assert_eq!(report.text_edits, 0);
    assert_eq!(editor.contents(), DOC);
    assert_eq!(report.visual_patches, 2);
}

#[test]
fn header_edit_leaves_other_line_endings_alone() {
    let mut editor = MemoryEditor::new("> [!note] A\n> body\r\nplain\n");

    operate_text_only(
        &mut editor,
        request(Scope::All, Mode::Collapse),
        &EngineOptions::default(),
    )
    .unwrap();

    assert_eq!(editor.contents(), "> [!note]- A\n> body\r\nplain\n");
}

#[test]
fn custom_heading_marker_changes_sections() {
    let text = "= A\n> [!a] A\n= B\n> [!b] B";
    let mut editor = MemoryEditor::new(text).with_cursor(1);
    let options = EngineOptions {
        resolver: SectionResolver::new('='),
        ..EngineOptions::default()
    };

    operate_text_only(&mut editor, request(Scope::Section, Mode::Collapse), &options).unwrap();

    assert_eq!(headers(&editor.contents()), vec!["> [!a]- A", "> [!b] B"]);
}

// ===== operate: rendered view =====

#[test]
fn preview_patches_text_and_elements_together() {
    let (mut editor, mut surface) = preview(DOC, 0);

    let report = operate(
        &mut editor,
        Some(&mut surface),
        request(Scope::All, Mode::Expand),
        &EngineOptions::default(),
    )
    .unwrap();

    assert_eq!(report.text_edits, 1);
    assert_eq!(report.visual_patches, 1);
    let states: Vec<bool> = surface.elements().iter().map(|e| e.is_collapsed()).collect();
    // One, Nested, Two, Three; Nested is not a target
    assert_eq!(states, vec![false, true, false, false]);
}

#[test]
fn patched_elements_keep_icon_and_content_in_lockstep() {
    let (mut editor, mut surface) = preview(DOC, 0);

    operate(
        &mut editor,
        Some(&mut surface),
        request(Scope::All, Mode::Collapse),
        &EngineOptions::default(),
    )
    .unwrap();

    for element in surface.elements() {
        assert_eq!(element.icon_collapsed(), element.is_collapsed());
        assert_eq!(element.content_hidden(), element.is_collapsed());
    }
}

#[test]
fn elements_already_in_state_are_not_repatched() {
    let (mut editor, mut surface) = preview(DOC, 0);

    operate(
        &mut editor,
        Some(&mut surface),
        request(Scope::All, Mode::Collapse),
        &EngineOptions::default(),
    )
    .unwrap();

    let two = &surface.elements()[2];
    assert_eq!(two.title(), "Two");
    assert_eq!(two.patch_count(), 0);
}

#[test]
fn source_mode_skips_the_surface() {
    let mut editor = MemoryEditor::new(DOC);
    let mut surface = MemorySurface::render(DOC);

    let report = operate(
        &mut editor,
        Some(&mut surface),
        request(Scope::All, Mode::Collapse),
        &EngineOptions::default(),
    )
    .unwrap();

    assert_eq!(report.visual_patches, 0);
    assert_eq!(report.text_edits, 2);
    assert!(surface.elements().iter().all(|e| e.patch_count() == 0));
    assert!(surface.elements().iter().all(|e| e.position().is_none()));
}

#[test]
fn correlated_elements_get_position_tags() {
    let (mut editor, mut surface) = preview(DOC, 0);

    let report = operate(
        &mut editor,
        Some(&mut surface),
        request(Scope::Current, Mode::Collapse),
        &EngineOptions::default(),
    )
    .unwrap();

    assert_eq!(report.tagged, 4);
    assert_eq!(surface.elements()[0].position(), Some(LineRange::new(1, 4)));
    assert_eq!(surface.elements()[3].position(), Some(LineRange::new(9, 10)));
}

#[test]
fn tagging_can_be_disabled() {
    let (mut editor, mut surface) = preview(DOC, 0);
    let options = EngineOptions {
        tag_positions: false,
        ..EngineOptions::default()
    };

    let report = operate(
        &mut editor,
        Some(&mut surface),
        request(Scope::All, Mode::Collapse),
        &options,
    )
    .unwrap();

    assert_eq!(report.tagged, 0);
    assert!(surface.elements().iter().all(|e| e.position().is_none()));
}

#[test]
fn unmatched_element_is_patched_only_for_all() {
    let text = "> [!note] Known";
    let elements = vec![
        MemoryElement::new("Known", "note", false),
        MemoryElement::new("Orphan", "tip", false),
    ];

    let mut editor = MemoryEditor::new(text).with_view_mode(ViewMode::Preview);
    let mut surface = MemorySurface::new(elements.clone());
    let report = operate(
        &mut editor,
        Some(&mut surface),
        request(Scope::Current, Mode::Collapse),
        &EngineOptions::default(),
    )
    .unwrap();
    assert_eq!(report.unmatched_elements, 1);
    assert!(!surface.elements()[1].is_collapsed());

    let mut editor = MemoryEditor::new(text).with_view_mode(ViewMode::Preview);
    let mut surface = MemorySurface::new(elements);
    let report = operate(
        &mut editor,
        Some(&mut surface),
        request(Scope::All, Mode::Collapse),
        &EngineOptions::default(),
    )
    .unwrap();
    assert_eq!(report.visual_patches, 2);
    assert!(surface.elements()[1].is_collapsed());
}

#[test]
fn unmatched_elements_follow_uniform_toggle() {
    // Text targets: one expanded, so toggle collapses everything
    let text = "> [!note] Known";
    let mut editor = MemoryEditor::new(text).with_view_mode(ViewMode::Preview);
    let mut surface = MemorySurface::new(vec![
        MemoryElement::new("Known", "note", false),
        MemoryElement::new("Orphan", "tip", true),
    ]);

    operate(
        &mut editor,
        Some(&mut surface),
        request(Scope::All, Mode::Toggle),
        &EngineOptions::default(),
    )
    .unwrap();

    assert!(surface.elements().iter().all(|e| e.is_collapsed()));
}

#[test]
fn unmatched_elements_flip_individually() {
    let text = "plain";
    let mut editor = MemoryEditor::new(text).with_view_mode(ViewMode::Preview);
    let mut surface = MemorySurface::new(vec![
        MemoryElement::new("A", "note", true),
        MemoryElement::new("B", "tip", false),
    ]);

    operate(
        &mut editor,
        Some(&mut surface),
        request(Scope::All, Mode::ToggleIndividual),
        &EngineOptions::default(),
    )
    .unwrap();

    let states: Vec<bool> = surface.elements().iter().map(|e| e.is_collapsed()).collect();
    assert_eq!(states, vec![false, true]);
}

#[test]
fn duplicate_titles_patch_their_own_elements() {
    let text = "> [!note] Same\n\n> [!note] Same";
    let (mut editor, mut surface) = preview(text, 2);

    operate(
        &mut editor,
        Some(&mut surface),
        request(Scope::Current, Mode::Collapse),
        &EngineOptions::default(),
    )
    .unwrap();

    let states: Vec<bool> = surface.elements().iter().map(|e| e.is_collapsed()).collect();
    assert_eq!(states, vec![false, true]);
    assert_eq!(headers(&editor.contents()), vec!["> [!note] Same", "> [!note]- Same"]);
}

#[test]
fn loose_title_match_keeps_text_and_view_aligned() {
    let text = "> [!note] Setup **notes**\n\n> [!note] Setup";
    let mut editor = MemoryEditor::new(text).with_view_mode(ViewMode::Preview);
    let mut surface = MemorySurface::new(vec![
        MemoryElement::new("Setup notes", "note", false),
        MemoryElement::new("Setup", "note", false),
    ]);
    let options = EngineOptions::default();

    operate(
        &mut editor,
        Some(&mut surface),
        request(Scope::Current, Mode::Collapse),
        &options,
    )
    .unwrap();

    assert_eq!(
        headers(&editor.contents()),
        vec!["> [!note]- Setup **notes**", "> [!note] Setup"]
    );
    let states: Vec<bool> = surface.elements().iter().map(|e| e.is_collapsed()).collect();
    assert_eq!(states, vec![true, false]);

    // A second run must not be steered by tags from the first
    editor.set_cursor(2);
    operate(
        &mut editor,
        Some(&mut surface),
        request(Scope::Current, Mode::Collapse),
        &options,
    )
    .unwrap();

    let states: Vec<bool> = surface.elements().iter().map(|e| e.is_collapsed()).collect();
    assert_eq!(states, vec![true, true]);
    assert_eq!(
        headers(&editor.contents()),
        vec!["> [!note]- Setup **notes**", "> [!note]- Setup"]
    );
}

// ===== failures =====

#[test]
fn unavailable_editor_aborts_before_side_effects() {
    let mut editor = MemoryEditor::new(DOC).unavailable();
    let mut surface = MemorySurface::render(DOC);

    let err = operate(
        &mut editor,
        Some(&mut surface),
        request(Scope::All, Mode::Collapse),
        &EngineOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(err, HostError::EditorUnavailable));
    assert!(surface.elements().iter().all(|e| e.patch_count() == 0));
}

#[test]
fn unavailable_surface_aborts_before_text_edits() {
    let mut editor = MemoryEditor::new(DOC).with_view_mode(ViewMode::Preview);
    let mut surface = MemorySurface::render(DOC).unavailable();

    let err = operate(
        &mut editor,
        Some(&mut surface),
        request(Scope::All, Mode::Collapse),
        &EngineOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(err, HostError::VisualRootUnavailable));
    assert!(editor.applied_edits().is_empty());
    assert_eq!(editor.contents(), DOC);
}

#[test]
fn run_operation_reports_failure_as_notice() {
    let mut editor = MemoryEditor::new(DOC).unavailable();

    let report = run_operation::<_, MemorySurface>(
        &mut editor,
        None,
        request(Scope::All, Mode::Collapse),
        &EngineOptions::default(),
    );

    assert!(report.is_none());
    assert_eq!(editor.notices().len(), 1);
    assert!(editor.notices()[0].contains("collapse"));
}

#[test]
fn run_operation_returns_report_on_success() {
    let (mut editor, mut surface) = preview(DOC, 0);

    let report = run_operation(
        &mut editor,
        Some(&mut surface),
        request(Scope::All, Mode::Expand),
        &EngineOptions::default(),
    )
    .unwrap();

    assert_eq!(report.scope, Scope::All);
    assert_eq!(report.mode, Mode::Expand);
    assert!(editor.notices().is_empty());
}
