//! Host boundary.
//!
//! The engine never owns the document or the rendered view. It reads them
//! through these traits at the start of every operation and writes back
//! through them at the end:
//!
//! - [`Editor`] - the text buffer: full text, single-range replacement,
//!   cursor line, view mode and user notices
//! - [`VisualSurface`] - the rendered view, yielding [`VisualElement`]s
//!
//! Whether the rendered view is worth patching at all is decided in exactly
//! one place, [`visual_patching_enabled`].

pub mod buffer;
pub mod file;
pub mod memory;

pub use buffer::LineBuffer;
pub use file::FileEditor;
pub use memory::{MemoryEditor, MemoryElement, MemorySurface};

use crate::model::error::HostError;
use crate::model::LineRange;
use crate::mutation::LineEdit;

/// How the host is currently presenting the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Raw text editing; rendered callouts may not exist.
    #[default]
    Source,
    /// Rendered view.
    Preview,
}

/// Text buffer of the active document.
pub trait Editor {
    /// Full current text.
    fn text(&self) -> Result<String, HostError>;

    /// Replace one range of text. The engine only ever replaces a whole
    /// header line.
    fn replace_line_range(&mut self, edit: &LineEdit) -> Result<(), HostError>;

    /// 0-based line of the cursor.
    fn cursor_line(&self) -> Result<usize, HostError>;

    /// Current presentation mode.
    fn view_mode(&self) -> ViewMode;

    /// Show a short message to the user.
    fn notify(&mut self, message: &str);
}

/// A rendered callout.
///
/// Elements have no identity across re-renders and no intrinsic line
/// information; [`VisualElement::position`] is only set once the element has
/// been correlated and tagged.
pub trait VisualElement {
    /// Rendered title text.
    fn title(&self) -> &str;

    /// Rendered type tag.
    fn callout_type(&self) -> &str;

    /// Whether the element is currently shown collapsed.
    fn is_collapsed(&self) -> bool;

    /// Set the collapsed state. Must be idempotent and keep the collapsed
    /// marker, fold icon and content visibility in lockstep.
    fn apply_state(&mut self, collapsed: bool);

    /// Source line range recorded by a previous correlation, if any.
    fn position(&self) -> Option<LineRange>;

    /// Record the source line range this element was correlated with.
    fn set_position(&mut self, range: LineRange);
}

/// The rendered view of the active document.
pub trait VisualSurface {
    /// Element type of this surface.
    type Element: VisualElement;

    /// Rendered callouts in document order.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::VisualRootUnavailable`] when the view cannot be
    /// reached.
    fn elements_mut(&mut self) -> Result<&mut [Self::Element], HostError>;
}

/// Whether patching rendered elements is possible and meaningful.
///
/// In source mode rendered callouts may not exist, so every operation
/// degrades to text-only.
pub fn visual_patching_enabled(mode: ViewMode, has_surface: bool) -> bool {
    has_surface && mode == ViewMode::Preview
}
