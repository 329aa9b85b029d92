//! File-backed editor.
//!
//! Loads a markdown file once, applies edits in memory and writes the result
//! back on [`FileEditor::save`]. Always reports [`ViewMode::Source`]: there is
//! no rendered view behind a plain file.

use super::{Editor, LineBuffer, ViewMode};
use crate::model::error::HostError;
use crate::mutation::LineEdit;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Editor over a document on disk.
#[derive(Debug)]
pub struct FileEditor {
    path: PathBuf,
    buffer: LineBuffer,
    cursor_line: usize,
    dirty: bool,
}

impl FileEditor {
    /// Read the file at `path`, placing the cursor on `cursor_line`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Io`] if the file cannot be read.
    pub fn open(path: impl AsRef<Path>, cursor_line: usize) -> Result<Self, HostError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| HostError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            buffer: LineBuffer::from_text(&text),
            cursor_line,
            dirty: false,
        })
    }

    /// Path of the document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether any edit has been applied since opening or saving.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Current (possibly unsaved) text.
    pub fn contents(&self) -> String {
        self.buffer.text()
    }

    /// Write the buffer back if it changed.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Io`] if writing fails.
    pub fn save(&mut self) -> Result<(), HostError> {
        if !self.dirty {
            return Ok(());
        }
        std::fs::write(&self.path, self.buffer.text()).map_err(|source| HostError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.dirty = false;
        info!(path = ?self.path, "Saved document");
        Ok(())
    }
}

impl Editor for FileEditor {
    fn text(&self) -> Result<String, HostError> {
        Ok(self.buffer.text())
    }

    fn replace_line_range(&mut self, edit: &LineEdit) -> Result<(), HostError> {
        self.buffer.apply(edit)?;
        self.dirty = true;
        Ok(())
    }

    fn cursor_line(&self) -> Result<usize, HostError> {
        Ok(self.cursor_line)
    }

    fn view_mode(&self) -> ViewMode {
        ViewMode::Source
    }

    fn notify(&mut self, message: &str) {
        warn!(path = ?self.path, "{message}");
        eprintln!("{message}");
    }
}
