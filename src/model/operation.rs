//! Operation request types: which callouts to target and how to set them.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Selection policy for the callouts an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    /// The innermost callout containing the reference line, else the closest
    /// callout whose header is at or above it.
    Current,
    /// Top-level callouts fully inside the reference line's heading section.
    Section,
    /// Every top-level callout in the document.
    All,
}

/// State-assignment policy applied over the targeted callouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Every target becomes collapsed.
    Collapse,
    /// Every target becomes expanded.
    Expand,
    /// Majority rules: all targets get the minority state flipped into unanimity.
    Toggle,
    /// Each target flips its own state independently.
    ToggleIndividual,
}

impl Mode {
    /// Compute the new collapsed state for each of `current` (one entry per
    /// target, same order).
    ///
    /// For [`Mode::Toggle`], all targets become collapsed iff fewer than half
    /// of them are currently collapsed.
    pub fn assign(&self, current: &[bool]) -> Vec<bool> {
        match self {
            Mode::Collapse => vec![true; current.len()],
            Mode::Expand => vec![false; current.len()],
            Mode::ToggleIndividual => current.iter().map(|c| !c).collect(),
            Mode::Toggle => {
                let collapsed = current.iter().filter(|c| **c).count();
                // collapsed < len / 2, kept in integers
                let target = collapsed * 2 < current.len();
                vec![target; current.len()]
            }
        }
    }
}

/// A complete operation: scope, mode, and whether the text is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationRequest {
    /// Which callouts are targeted.
    pub scope: Scope,
    /// How their new state is decided.
    pub mode: Mode,
    /// Persist the new state into the header lines.
    pub write_text: bool,
}

impl OperationRequest {
    /// Request that persists to text.
    pub fn new(scope: Scope, mode: Mode) -> Self {
        Self {
            scope,
            mode,
            write_text: true,
        }
    }

    /// Same request with `write_text` replaced.
    pub fn with_write_text(mut self, write_text: bool) -> Self {
        self.write_text = write_text;
        self
    }
}

/// Error for unrecognized scope/mode names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} '{value}'")]
pub struct UnknownVariant {
    /// "scope" or "mode".
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl FromStr for Scope {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "current" => Ok(Scope::Current),
            "section" => Ok(Scope::Section),
            "all" => Ok(Scope::All),
            _ => Err(UnknownVariant {
                kind: "scope",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for Mode {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "collapse" => Ok(Mode::Collapse),
            "expand" => Ok(Mode::Expand),
            "toggle" => Ok(Mode::Toggle),
            "toggle-individual" => Ok(Mode::ToggleIndividual),
            _ => Err(UnknownVariant {
                kind: "mode",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scope::Current => "current",
            Scope::Section => "section",
            Scope::All => "all",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Collapse => "collapse",
            Mode::Expand => "expand",
            Mode::Toggle => "toggle",
            Mode::ToggleIndividual => "toggle-individual",
        };
        f.write_str(name)
    }
}
