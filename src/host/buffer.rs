//! Line-indexed text buffer shared by the in-memory and file editors.

use crate::model::error::HostError;
use crate::mutation::LineEdit;

/// Document text split into lines, each remembering its own terminator.
///
/// Mixed `\n`/`\r\n` documents are written back byte for byte apart from
/// the edited text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineBuffer {
    lines: Vec<String>,
    // Parallel to `lines`: "\n", "\r\n", or "" for an unterminated last line
    endings: Vec<&'static str>,
}

impl LineBuffer {
    /// Split `text` into lines the way [`str::lines`] does.
    pub fn from_text(text: &str) -> Self {
        let (lines, endings): (Vec<String>, Vec<&'static str>) = text
            .split_inclusive('\n')
            .map(|piece| {
                if let Some(line) = piece.strip_suffix("\r\n") {
                    (line.to_string(), "\r\n")
                } else if let Some(line) = piece.strip_suffix('\n') {
                    (line.to_string(), "\n")
                } else {
                    (piece.to_string(), "")
                }
            })
            .unzip();
        Self { lines, endings }
    }

    /// Rejoin the lines with their original terminators.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .zip(&self.endings)
            .flat_map(|(line, ending)| [line.as_str(), *ending])
            .collect()
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// A single line, if it exists.
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Apply a single-line edit. Columns are clamped to the line length.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::LineOutOfRange`] if `edit.line` does not exist.
    pub fn apply(&mut self, edit: &LineEdit) -> Result<(), HostError> {
        let line_count = self.lines.len();
        let line = self
            .lines
            .get_mut(edit.line)
            .ok_or(HostError::LineOutOfRange {
                line: edit.line,
                line_count,
            })?;

        let chars: Vec<char> = line.chars().collect();
        let end = edit.end_col.min(chars.len());
        let start = edit.start_col.min(end);

        let mut updated: String = chars[..start].iter().collect();
        updated.push_str(&edit.text);
        updated.extend(&chars[end..]);
        *line = updated;

        Ok(())
    }
}
