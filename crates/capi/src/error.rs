//! Outcome codes across the C boundary
//!
//! Codes are `lifo_core::Outcome::code()` values. The last-error cell is the
//! core crate's thread-local one, so Rust and C callers on the same thread see
//! the same history.

use lifo_core::{Outcome, StackError, error};
use std::ffi::{CStr, c_char, c_int};

/// Outcome names indexed by code
static OUTCOME_NAMES: [&CStr; 11] = [
    c"STACK_OK",
    c"STACK_NULL_PTR",
    c"STACK_INVALID_TYPE",
    c"STACK_INVALID_ARGS",
    c"STACK_ALLOC_FAILED",
    c"STACK_DATA_COPY_FAILED",
    c"STACK_EMPTY",
    c"STACK_FULL",
    c"STACK_NULL_OUT",
    c"STACK_NULL_DATA",
    c"STACK_UNKNOWN_ERROR",
];

/// Record `result` as the thread's last outcome and convert it to its code
pub(crate) fn finish(result: Result<(), StackError>) -> c_int {
    if let Err(err @ (StackError::NullHandle | StackError::NullOutput)) = result {
        tracing::debug!(code = err.code(), "null pointer rejected at the C boundary");
    }
    Outcome::of(&error::record(result)).code()
}

/// Code of the most recent stack operation on the calling thread
#[unsafe(no_mangle)]
pub extern "C" fn stack_get_last_error() -> c_int {
    error::last().code()
}

/// Symbolic name for an outcome code
///
/// Unrecognised codes map to `STACK_UNKNOWN_ERROR`. The returned string is
/// static and must not be freed.
#[unsafe(no_mangle)]
pub extern "C" fn stack_error_str(code: c_int) -> *const c_char {
    let code = Outcome::from_code(code).code();
    OUTCOME_NAMES[code as usize].as_ptr()
}
