//! Process exit codes. A failure report is an expected outcome, a fault is not.

pub const SUCCESS: i32 = 0;
/// Bad arguments, unreadable input files, unknown provider.
pub const INVALID_INPUT: i32 = 2;
/// The map returned a failure report.
pub const FAILURE_REPORT: i32 = 3;
/// A fault or a runtime problem (transport, contract violation).
pub const FAULT: i32 = 4;
