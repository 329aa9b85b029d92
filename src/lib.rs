//! Callout Sync
//!
//! Collapse, expand and toggle Obsidian-style callouts in Markdown text,
//! keeping the `+`/`-` markers in the source and an optional rendered view
//! in agreement.
//!
//! The crate follows a pure core / impure shell split: parsing, mutation,
//! section resolution and correlation are pure functions over snapshots;
//! the [`host`] traits are the only place side effects happen.

pub mod config;
pub mod correlate;
pub mod host;
pub mod logging;
pub mod model;
pub mod mutation;
pub mod outline;
pub mod parser;
pub mod section;
pub mod state;
