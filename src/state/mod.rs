//! Operation state handling.
//!
//! Operations are pure functions of the host snapshots they read; nothing
//! here survives between invocations.

pub mod operation_handler;

pub use operation_handler::{
    decide, operate, operate_text_only, run_operation, select_targets, EngineOptions,
    OperationReport,
};
