//! In-memory host for embedding and tests.
//!
//! [`MemorySurface::render`] stands in for a host renderer: it produces one
//! element per parsed callout, in document order, without position tags.

use super::{Editor, LineBuffer, ViewMode, VisualElement, VisualSurface};
use crate::model::error::HostError;
use crate::model::{Callout, LineRange};
use crate::mutation::LineEdit;
use crate::parser;

/// Text buffer held in memory.
#[derive(Debug, Clone)]
pub struct MemoryEditor {
    buffer: LineBuffer,
    cursor_line: usize,
    view_mode: ViewMode,
    available: bool,
    edits: Vec<LineEdit>,
    notices: Vec<String>,
}

impl MemoryEditor {
    /// Editor in source mode with the cursor on line 0.
    pub fn new(text: &str) -> Self {
        Self {
            buffer: LineBuffer::from_text(text),
            cursor_line: 0,
            view_mode: ViewMode::Source,
            available: true,
            edits: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Same editor with the cursor on `line`.
    pub fn with_cursor(mut self, line: usize) -> Self {
        self.cursor_line = line;
        self
    }

    /// Same editor in `mode`.
    pub fn with_view_mode(mut self, mode: ViewMode) -> Self {
        self.view_mode = mode;
        self
    }

    /// Simulate "no active editor": every read fails.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Move the cursor.
    pub fn set_cursor(&mut self, line: usize) {
        self.cursor_line = line;
    }

    /// Current text.
    pub fn contents(&self) -> String {
        self.buffer.text()
    }

    /// Every edit applied so far, in application order.
    pub fn applied_edits(&self) -> &[LineEdit] {
        &self.edits
    }

    /// Notices shown to the user.
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    fn check_available(&self) -> Result<(), HostError> {
        if self.available {
            Ok(())
        } else {
            Err(HostError::EditorUnavailable)
        }
    }
}

impl Editor for MemoryEditor {
    fn text(&self) -> Result<String, HostError> {
        self.check_available()?;
        Ok(self.buffer.text())
    }

    fn replace_line_range(&mut self, edit: &LineEdit) -> Result<(), HostError> {
        self.check_available()?;
        self.buffer.apply(edit)?;
        self.edits.push(edit.clone());
        Ok(())
    }

    fn cursor_line(&self) -> Result<usize, HostError> {
        self.check_available()?;
        Ok(self.cursor_line)
    }

    fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}

/// A rendered callout held in memory.
///
/// Tracks the three pieces of view state a host toggles together: the
/// collapsed marker, the fold icon and the content visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryElement {
    title: String,
    callout_type: String,
    collapsed: bool,
    icon_collapsed: bool,
    content_hidden: bool,
    position: Option<LineRange>,
    patch_count: usize,
}

impl MemoryElement {
    /// Untagged element with consistent view state.
    pub fn new(title: impl Into<String>, callout_type: impl Into<String>, collapsed: bool) -> Self {
        Self {
            title: title.into(),
            callout_type: callout_type.into(),
            collapsed,
            icon_collapsed: collapsed,
            content_hidden: collapsed,
            position: None,
            patch_count: 0,
        }
    }

    /// Whether the fold icon shows the collapsed state.
    pub fn icon_collapsed(&self) -> bool {
        self.icon_collapsed
    }

    /// Whether the body is hidden.
    pub fn content_hidden(&self) -> bool {
        self.content_hidden
    }

    /// How many times `apply_state` actually changed something.
    pub fn patch_count(&self) -> usize {
        self.patch_count
    }
}

impl VisualElement for MemoryElement {
    fn title(&self) -> &str {
        &self.title
    }

    fn callout_type(&self) -> &str {
        &self.callout_type
    }

    fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    fn apply_state(&mut self, collapsed: bool) {
        if self.collapsed == collapsed {
            return;
        }
        self.collapsed = collapsed;
        self.icon_collapsed = collapsed;
        self.content_hidden = collapsed;
        self.patch_count += 1;
    }

    fn position(&self) -> Option<LineRange> {
        self.position
    }

    fn set_position(&mut self, range: LineRange) {
        self.position = Some(range);
    }
}

/// Rendered view held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    elements: Vec<MemoryElement>,
    unavailable: bool,
}

impl MemorySurface {
    /// Surface over the given elements.
    pub fn new(elements: Vec<MemoryElement>) -> Self {
        Self {
            elements,
            unavailable: false,
        }
    }

    /// Render `text` the way a host would: one untagged element per callout,
    /// nested ones included, in document order.
    pub fn render(text: &str) -> Self {
        let callouts = parser::parse_document(text);
        let elements = parser::flatten(&callouts)
            .into_iter()
            .map(element_for)
            .collect();
        Self::new(elements)
    }

    /// Simulate a view whose root cannot be reached.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Read-only view of the elements.
    pub fn elements(&self) -> &[MemoryElement] {
        &self.elements
    }
}

fn element_for(callout: &Callout) -> MemoryElement {
    MemoryElement::new(callout.title(), callout.callout_type(), callout.is_collapsed())
}

impl VisualSurface for MemorySurface {
    type Element = MemoryElement;

    fn elements_mut(&mut self) -> Result<&mut [MemoryElement], HostError> {
        if self.unavailable {
            return Err(HostError::VisualRootUnavailable);
        }
        Ok(&mut self.elements)
    }
}
