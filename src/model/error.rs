//! Error types for callout-sync.
//!
//! Only the host boundary can fail. Parsing, correlation and state decisions
//! are total functions that report "not found" as `None` or an empty `Vec`,
//! so the taxonomy here is small:
//!
//! - [`AppError`] - Top-level error for the binary and `run_operation`
//!   - [`HostError`] - Editor or visual surface could not be reached or edited
//!   - [`ConfigError`](crate::config::ConfigError) - Settings file unreadable or invalid
//!   - [`LoggingError`](crate::logging::LoggingError) - Tracing setup failed
//!   - `serde_json::Error` - `--outline --json` output failed
//!
//! # Recovery Strategy
//!
//! Host errors abort the current operation. `run_operation` catches them,
//! logs them and turns them into a notice for the user; nothing is retried.
//! Because every host snapshot is taken before the first edit, a
//! [`HostError::EditorUnavailable`] or [`HostError::VisualRootUnavailable`]
//! never leaves a document half-updated.

use crate::config::ConfigError;
use crate::logging::LoggingError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error.
///
/// Domain errors convert into it via `From`, so `?` works across layers.
#[derive(Debug, Error)]
pub enum AppError {
    /// The host editor or visual surface failed.
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// Settings could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tracing could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// The callout tree could not be serialized for output.
    #[error("Output error: {0}")]
    Render(#[from] serde_json::Error),
}

/// Failures at the host boundary.
///
/// `EditorUnavailable` and `VisualRootUnavailable` are raised before any side
/// effect; the remaining variants can occur while edits are being applied.
#[derive(Debug, Error)]
pub enum HostError {
    /// No active editor at invocation time.
    ///
    /// # Examples
    ///
    /// ```
    /// use callout_sync::model::error::HostError;
    ///
    /// let err = HostError::EditorUnavailable;
    /// assert!(err.to_string().contains("No active editor"));
    /// ```
    #[error("No active editor")]
    EditorUnavailable,

    /// The rendered view exists but its root element cannot be reached.
    #[error("Rendered view is not available")]
    VisualRootUnavailable,

    /// A replacement targeted a line the buffer does not have.
    #[error("Line {line} is out of range (document has {line_count} lines)")]
    LineOutOfRange {
        /// The 0-based line that was requested.
        line: usize,
        /// Number of lines currently in the buffer.
        line_count: usize,
    },

    /// Reading or writing a file-backed document failed.
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// The document path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl HostError {
    /// Whether this error means the host could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            HostError::EditorUnavailable | HostError::VisualRootUnavailable
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_error_converts_into_app_error() {
        fn fails() -> Result<(), AppError> {
            Err(HostError::EditorUnavailable)?;
            Ok(())
        }

        let err = fails().unwrap_err();
        assert!(matches!(err, AppError::Host(HostError::EditorUnavailable)));
        assert_eq!(err.to_string(), "Host error: No active editor");
    }

    #[test]
    fn line_out_of_range_reports_both_numbers() {
        let err = HostError::LineOutOfRange {
            line: 12,
            line_count: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("12"), "message should name the line: {msg}");
        assert!(msg.contains("4 lines"), "message should name the count: {msg}");
    }

    #[test]
    fn only_unavailable_variants_are_unavailable() {
        assert!(HostError::EditorUnavailable.is_unavailable());
        assert!(HostError::VisualRootUnavailable.is_unavailable());
        assert!(!HostError::LineOutOfRange {
            line: 0,
            line_count: 0
        }
        .is_unavailable());
    }
}
